//! Norm (threshold) models and per-reading checks

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reading::{OdorLevel, Reading};

/// Threshold configuration for a composter.
///
/// An absent bound means the parameter is not constrained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Norm {
    pub id: Uuid,
    pub composter_id: Uuid,
    pub temperature_max: Option<Decimal>,
    pub humidity_max: Option<Decimal>,
    pub compost_mass_max: Option<Decimal>,
    pub oxygenation_min: Option<Decimal>,
    pub wood_chips_added_max: Option<Decimal>,
    /// Raw odor text as configured; interpreted through [`OdorLevel`]
    pub odor_level_max: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// A checkable composter parameter.
///
/// Serializes as the label shown in reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Parameter {
    #[serde(rename = "Température")]
    Temperature,
    #[serde(rename = "Humidité")]
    Humidity,
    #[serde(rename = "Masse")]
    CompostMass,
    #[serde(rename = "Oxygène")]
    Oxygenation,
    #[serde(rename = "Copeaux ajoutés")]
    WoodChipsAdded,
    #[serde(rename = "Niveau d'odeur")]
    OdorLevel,
}

impl Parameter {
    /// Numeric parameters, in report order
    pub const NUMERIC: [Parameter; 5] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::CompostMass,
        Parameter::Oxygenation,
        Parameter::WoodChipsAdded,
    ];

    /// Every checkable parameter, in the order violations are listed
    pub const ALL: [Parameter; 6] = [
        Parameter::Temperature,
        Parameter::Humidity,
        Parameter::OdorLevel,
        Parameter::CompostMass,
        Parameter::Oxygenation,
        Parameter::WoodChipsAdded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Parameter::Temperature => "Température",
            Parameter::Humidity => "Humidité",
            Parameter::CompostMass => "Masse",
            Parameter::Oxygenation => "Oxygène",
            Parameter::WoodChipsAdded => "Copeaux ajoutés",
            Parameter::OdorLevel => "Niveau d'odeur",
        }
    }

    /// Field name used by readings and query strings
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Temperature => "temperature",
            Parameter::Humidity => "humidity",
            Parameter::CompostMass => "compost_mass",
            Parameter::Oxygenation => "oxygenation",
            Parameter::WoodChipsAdded => "wood_chips_added",
            Parameter::OdorLevel => "odor_level",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Which side of the bound counts as a violation
    pub fn direction(self) -> Direction {
        match self {
            Parameter::Oxygenation => Direction::Below,
            _ => Direction::Above,
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Comparison direction of a bound
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Value must not exceed the bound
    Above,
    /// Value must not fall below the bound
    Below,
}

impl Direction {
    pub fn symbol(self) -> &'static str {
        match self {
            Direction::Above => ">",
            Direction::Below => "<",
        }
    }
}

/// An observed value or threshold for one parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParameterValue {
    Measure(Decimal),
    Level(OdorLevel),
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterValue::Measure(value) => write!(f, "{}", value.normalize()),
            ParameterValue::Level(level) => write!(f, "{}", level),
        }
    }
}

/// One exceeded parameter on one reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViolationDetail {
    pub param: Parameter,
    pub value: ParameterValue,
    pub norm: ParameterValue,
    pub direction: Direction,
}

impl Norm {
    /// Configured numeric bound for a parameter
    pub fn bound(&self, parameter: Parameter) -> Option<Decimal> {
        match parameter {
            Parameter::Temperature => self.temperature_max,
            Parameter::Humidity => self.humidity_max,
            Parameter::CompostMass => self.compost_mass_max,
            Parameter::Oxygenation => self.oxygenation_min,
            Parameter::WoodChipsAdded => self.wood_chips_added_max,
            Parameter::OdorLevel => None,
        }
    }

    /// Odor bound on the scale, `None` when absent or unrecognized
    pub fn odor_bound(&self) -> Option<OdorLevel> {
        self.odor_level_max.as_deref().and_then(OdorLevel::from_label)
    }

    /// Check one parameter of a reading.
    ///
    /// Returns `None` when the parameter is compliant or cannot be
    /// evaluated (value or bound absent, odor text off the scale).
    pub fn check(&self, reading: &Reading, parameter: Parameter) -> Option<ViolationDetail> {
        let direction = parameter.direction();

        if parameter == Parameter::OdorLevel {
            let (level, bound) = (reading.odor()?, self.odor_bound()?);
            return level.exceeds(bound).then_some(ViolationDetail {
                param: parameter,
                value: ParameterValue::Level(level),
                norm: ParameterValue::Level(bound),
                direction,
            });
        }

        let (value, bound) = (reading.measure(parameter)?, self.bound(parameter)?);
        let violated = match direction {
            Direction::Above => value > bound,
            Direction::Below => value < bound,
        };

        violated.then_some(ViolationDetail {
            param: parameter,
            value: ParameterValue::Measure(value),
            norm: ParameterValue::Measure(bound),
            direction,
        })
    }

    /// Whether a single parameter of a reading is out of bounds
    pub fn is_exceeded(&self, reading: &Reading, parameter: Parameter) -> bool {
        self.check(reading, parameter).is_some()
    }

    /// All exceeded parameters of a reading, in [`Parameter::ALL`] order
    pub fn violations(&self, reading: &Reading) -> Vec<ViolationDetail> {
        Parameter::ALL
            .into_iter()
            .filter_map(|parameter| self.check(reading, parameter))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn empty_norm() -> Norm {
        Norm {
            id: Uuid::new_v4(),
            composter_id: Uuid::new_v4(),
            temperature_max: None,
            humidity_max: None,
            compost_mass_max: None,
            oxygenation_min: None,
            wood_chips_added_max: None,
            odor_level_max: None,
            updated_at: Utc::now(),
        }
    }

    fn empty_reading() -> Reading {
        Reading {
            id: Uuid::new_v4(),
            composter_id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            recorded_by: None,
            temperature: None,
            humidity: None,
            odor_level: None,
            compost_mass: None,
            oxygenation: None,
            dry_matter: false,
            wood_chips_added: None,
        }
    }

    #[test]
    fn test_upper_bound_is_strict() {
        let norm = Norm { temperature_max: Some(dec("50")), ..empty_norm() };
        let at_bound = Reading { temperature: Some(dec("50")), ..empty_reading() };
        let above = Reading { temperature: Some(dec("50.1")), ..empty_reading() };

        assert!(!norm.is_exceeded(&at_bound, Parameter::Temperature));
        assert!(norm.is_exceeded(&above, Parameter::Temperature));
    }

    #[test]
    fn test_oxygenation_is_a_lower_bound() {
        let norm = Norm { oxygenation_min: Some(dec("15")), ..empty_norm() };
        let low = Reading { oxygenation: Some(dec("12")), ..empty_reading() };
        let high = Reading { oxygenation: Some(dec("40")), ..empty_reading() };

        let detail = norm.check(&low, Parameter::Oxygenation).unwrap();
        assert_eq!(detail.direction, Direction::Below);
        assert_eq!(detail.value, ParameterValue::Measure(dec("12")));
        assert_eq!(detail.norm, ParameterValue::Measure(dec("15")));
        assert!(!norm.is_exceeded(&high, Parameter::Oxygenation));
    }

    #[test]
    fn test_absent_value_or_bound_is_not_evaluated() {
        let norm = Norm { humidity_max: Some(dec("60")), ..empty_norm() };
        let missing_value = empty_reading();
        assert!(norm.check(&missing_value, Parameter::Humidity).is_none());

        let reading = Reading { compost_mass: Some(dec("900")), ..empty_reading() };
        assert!(norm.check(&reading, Parameter::CompostMass).is_none());
    }

    #[test]
    fn test_odor_comparison() {
        let norm = Norm { odor_level_max: Some("Moyen".into()), ..empty_norm() };
        let strong = Reading { odor_level: Some("Fort".into()), ..empty_reading() };
        let weak = Reading { odor_level: Some("Faible".into()), ..empty_reading() };
        let unknown = Reading { odor_level: Some("Inconnu".into()), ..empty_reading() };

        let detail = norm.check(&strong, Parameter::OdorLevel).unwrap();
        assert_eq!(detail.value, ParameterValue::Level(OdorLevel::Fort));
        assert_eq!(detail.norm, ParameterValue::Level(OdorLevel::Moyen));
        assert!(!norm.is_exceeded(&weak, Parameter::OdorLevel));
        assert!(!norm.is_exceeded(&unknown, Parameter::OdorLevel));
    }

    #[test]
    fn test_unrecognized_odor_bound_disables_check() {
        let norm = Norm { odor_level_max: Some("moderate".into()), ..empty_norm() };
        let reading = Reading { odor_level: Some("Très fort".into()), ..empty_reading() };
        assert!(!norm.is_exceeded(&reading, Parameter::OdorLevel));
    }

    #[test]
    fn test_violations_lists_every_exceeded_parameter() {
        let norm = Norm {
            temperature_max: Some(dec("60")),
            humidity_max: Some(dec("70")),
            oxygenation_min: Some(dec("10")),
            odor_level_max: Some("Faible".into()),
            ..empty_norm()
        };
        let reading = Reading {
            temperature: Some(dec("65")),
            humidity: Some(dec("50")),
            oxygenation: Some(dec("5")),
            odor_level: Some("Moyen".into()),
            ..empty_reading()
        };

        let params: Vec<Parameter> = norm.violations(&reading).iter().map(|d| d.param).collect();
        assert_eq!(
            params,
            vec![Parameter::Temperature, Parameter::OdorLevel, Parameter::Oxygenation]
        );
    }

    #[test]
    fn test_parameter_keys_round_trip() {
        for parameter in Parameter::ALL {
            assert_eq!(Parameter::from_key(parameter.key()), Some(parameter));
        }
        assert_eq!(Parameter::from_key("dry_matter"), None);
    }

    #[test]
    fn test_detail_serializes_with_labels() {
        let detail = ViolationDetail {
            param: Parameter::Temperature,
            value: ParameterValue::Measure(dec("55")),
            norm: ParameterValue::Measure(dec("50")),
            direction: Direction::Above,
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["param"], "Température");
        assert_eq!(json["direction"], "above");
    }
}
