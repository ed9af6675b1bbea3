//! Composter report generation
//!
//! Aggregates a snapshot of readings against the composter's norm: reading
//! count, last odor level, per-parameter averages and the readings that broke
//! one or more bounds. The computation is pure and never fails on missing
//! data; only the JSON input boundary ([`ReportInput`]) can reject a request.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Norm, Parameter, Reading, ViolationDetail};

/// Decimal places kept on averages
pub const AVERAGE_SCALE: u32 = 2;

/// Aggregated summary for one composter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub composter_name: String,
    pub total_records: usize,
    pub last_odor_level: Option<String>,
    pub averages: Averages,
    pub norms: NormBounds,
    pub violations: Vec<ViolationRecord>,
}

/// Arithmetic means over the readings where each parameter was measured
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Averages {
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub compost_mass: Option<Decimal>,
    pub oxygenation: Option<Decimal>,
    pub wood_chips_added: Option<Decimal>,
}

impl Averages {
    pub fn get(&self, parameter: Parameter) -> Option<Decimal> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::CompostMass => self.compost_mass,
            Parameter::Oxygenation => self.oxygenation,
            Parameter::WoodChipsAdded => self.wood_chips_added,
            Parameter::OdorLevel => None,
        }
    }
}

/// Norm bounds echoed back as configured
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NormBounds {
    pub temperature_max: Option<Decimal>,
    pub humidity_max: Option<Decimal>,
    pub compost_mass_max: Option<Decimal>,
    pub oxygenation_min: Option<Decimal>,
    pub wood_chips_added_max: Option<Decimal>,
    pub odor_level_max: Option<String>,
}

impl From<Option<&Norm>> for NormBounds {
    fn from(norm: Option<&Norm>) -> Self {
        match norm {
            Some(norm) => Self {
                temperature_max: norm.temperature_max,
                humidity_max: norm.humidity_max,
                compost_mass_max: norm.compost_mass_max,
                oxygenation_min: norm.oxygenation_min,
                wood_chips_added_max: norm.wood_chips_added_max,
                odor_level_max: norm.odor_level_max.clone(),
            },
            None => Self::default(),
        }
    }
}

/// A reading with at least one exceeded parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViolationRecord {
    pub date: DateTime<Utc>,
    pub recorded_by: String,
    pub details: Vec<ViolationDetail>,
}

/// One exceeded parameter flattened for tabular export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ViolationRow {
    pub date: String,
    pub recorded_by: String,
    pub parameter: String,
    pub value: String,
    pub threshold: String,
    pub direction: String,
}

impl Report {
    /// Flatten violations to one row per exceeded parameter
    pub fn violation_rows(&self) -> Vec<ViolationRow> {
        self.violations
            .iter()
            .flat_map(|record| {
                record.details.iter().map(move |detail| ViolationRow {
                    date: record.date.format("%Y-%m-%d %H:%M").to_string(),
                    recorded_by: record.recorded_by.clone(),
                    parameter: detail.param.label().to_string(),
                    value: detail.value.to_string(),
                    threshold: detail.norm.to_string(),
                    direction: detail.direction.symbol().to_string(),
                })
            })
            .collect()
    }
}

/// Generate the report for one composter.
///
/// Violation records keep the order of `readings`; callers pass readings
/// in the order they want them displayed.
pub fn generate_report(composter_name: &str, readings: &[Reading], norm: Option<&Norm>) -> Report {
    let average = |parameter: Parameter| mean(readings.iter().filter_map(|r| r.measure(parameter)));

    let averages = Averages {
        temperature: average(Parameter::Temperature),
        humidity: average(Parameter::Humidity),
        compost_mass: average(Parameter::CompostMass),
        oxygenation: average(Parameter::Oxygenation),
        wood_chips_added: average(Parameter::WoodChipsAdded),
    };

    let violations = match norm {
        Some(norm) => readings
            .iter()
            .filter_map(|reading| {
                let details = norm.violations(reading);
                (!details.is_empty()).then(|| ViolationRecord {
                    date: reading.recorded_at,
                    recorded_by: reading.recorder_name(),
                    details,
                })
            })
            .collect(),
        None => Vec::new(),
    };

    Report {
        composter_name: composter_name.to_string(),
        total_records: readings.len(),
        last_odor_level: last_odor_level(readings),
        averages,
        norms: NormBounds::from(norm),
        violations,
    }
}

/// Odor text of the most recent reading that has one
pub fn last_odor_level(readings: &[Reading]) -> Option<String> {
    readings
        .iter()
        .filter(|r| r.odor_level.is_some())
        .max_by_key(|r| r.recorded_at)
        .and_then(|r| r.odor_level.clone())
}

fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let values: Vec<Decimal> = values.collect();
    if values.is_empty() {
        return None;
    }

    let count = Decimal::from(values.len());
    let mean = values
        .iter()
        .try_fold(Decimal::ZERO, |sum, v| sum.checked_add(*v))
        .map(|sum| sum / count)
        // Near the edge of the Decimal range, scale each term before summing
        .unwrap_or_else(|| {
            values
                .iter()
                .fold(Decimal::ZERO, |sum, v| sum.saturating_add(*v / count))
        });

    Some(mean.round_dp(AVERAGE_SCALE))
}

/// Input contract violations at the report boundary
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportError {
    #[error("readings collection is missing")]
    MissingReadings,

    #[error("composter name is missing")]
    MissingComposterName,

    #[error("malformed report input: {0}")]
    Malformed(String),
}

/// Report request as received from JSON callers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportInput {
    pub composter_name: Option<String>,
    pub readings: Option<Vec<Reading>>,
    pub norm: Option<Norm>,
}

impl ReportInput {
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::Malformed(e.to_string()))
    }

    /// Validate the input and generate the report
    pub fn generate(&self) -> Result<Report, ReportError> {
        let name = self
            .composter_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(ReportError::MissingComposterName)?;
        let readings = self.readings.as_deref().ok_or(ReportError::MissingReadings)?;

        Ok(generate_report(name, readings, self.norm.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, ParameterValue, Recorder};
    use chrono::TimeZone;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    fn reading(hour: u32) -> Reading {
        Reading {
            id: Uuid::new_v4(),
            composter_id: Uuid::nil(),
            recorded_at: at(hour),
            recorded_by: Some(Recorder {
                id: Uuid::nil(),
                first_name: "Jeanne".into(),
                last_name: "Martin".into(),
            }),
            temperature: None,
            humidity: None,
            odor_level: None,
            compost_mass: None,
            oxygenation: None,
            dry_matter: false,
            wood_chips_added: None,
        }
    }

    fn norm() -> Norm {
        Norm {
            id: Uuid::new_v4(),
            composter_id: Uuid::nil(),
            temperature_max: None,
            humidity_max: None,
            compost_mass_max: None,
            oxygenation_min: None,
            wood_chips_added_max: None,
            odor_level_max: None,
            updated_at: at(0),
        }
    }

    #[test]
    fn test_empty_readings() {
        let report = generate_report("C-01", &[], Some(&norm()));
        assert_eq!(report.total_records, 0);
        assert_eq!(report.averages, Averages::default());
        assert_eq!(report.last_odor_level, None);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_temperature_violation_example() {
        let norm = Norm { temperature_max: Some(dec("50")), ..norm() };
        let readings = vec![
            Reading { temperature: Some(dec("45")), ..reading(8) },
            Reading { temperature: Some(dec("55")), ..reading(9) },
            reading(10),
        ];

        let report = generate_report("C-01", &readings, Some(&norm));

        assert_eq!(report.total_records, 3);
        assert_eq!(report.violations.len(), 1);
        let record = &report.violations[0];
        assert_eq!(record.date, at(9));
        assert_eq!(record.recorded_by, "Jeanne Martin");
        assert_eq!(
            record.details,
            vec![ViolationDetail {
                param: Parameter::Temperature,
                value: ParameterValue::Measure(dec("55")),
                norm: ParameterValue::Measure(dec("50")),
                direction: Direction::Above,
            }]
        );
        assert_eq!(report.averages.temperature, Some(dec("50")));
    }

    #[test]
    fn test_average_skips_absent_values() {
        let readings = vec![
            Reading { oxygenation: Some(dec("20")), ..reading(1) },
            reading(2),
            Reading { oxygenation: Some(dec("30")), ..reading(3) },
        ];

        let report = generate_report("C-01", &readings, None);
        assert_eq!(report.averages.oxygenation, Some(dec("25")));
        assert_eq!(report.averages.temperature, None);
    }

    #[test]
    fn test_average_is_rounded() {
        let readings = vec![
            Reading { humidity: Some(dec("10")), ..reading(1) },
            Reading { humidity: Some(dec("10")), ..reading(2) },
            Reading { humidity: Some(dec("11")), ..reading(3) },
        ];

        let report = generate_report("C-01", &readings, None);
        assert_eq!(report.averages.humidity, Some(dec("10.33")));
    }

    #[test]
    fn test_average_of_extreme_values_does_not_overflow() {
        let readings = vec![
            Reading { temperature: Some(Decimal::MAX), ..reading(1) },
            Reading { temperature: Some(Decimal::MAX), ..reading(2) },
        ];

        let report = generate_report("C-01", &readings, None);
        let average = report.averages.temperature.unwrap();
        assert!(average > Decimal::MAX / Decimal::from(2));

        let readings = vec![
            Reading { compost_mass: Some(Decimal::MAX), ..reading(1) },
            Reading { compost_mass: Some(Decimal::MAX), ..reading(2) },
            Reading { compost_mass: Some(Decimal::MIN), ..reading(3) },
        ];

        let report = generate_report("C-01", &readings, None);
        let average = report.averages.compost_mass.unwrap();
        assert!(average > Decimal::ZERO);
        assert!(average < Decimal::MAX / Decimal::from(2));
    }

    #[test]
    fn test_last_odor_level_uses_latest_timestamp() {
        let readings = vec![
            Reading { odor_level: Some("Fort".into()), ..reading(12) },
            Reading { odor_level: Some("Faible".into()), ..reading(8) },
            reading(14),
        ];

        assert_eq!(last_odor_level(&readings), Some("Fort".to_string()));
    }

    #[test]
    fn test_last_odor_level_keeps_unrecognized_text() {
        let readings = vec![Reading { odor_level: Some("Inconnu".into()), ..reading(3) }];
        assert_eq!(last_odor_level(&readings), Some("Inconnu".to_string()));
    }

    #[test]
    fn test_missing_norm() {
        let readings = vec![
            Reading { temperature: Some(dec("99")), ..reading(1) },
            Reading { odor_level: Some("Très fort".into()), ..reading(2) },
        ];

        let report = generate_report("C-01", &readings, None);
        assert_eq!(report.total_records, 2);
        assert_eq!(report.norms, NormBounds::default());
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_norm_bounds_are_echoed() {
        let norm = Norm {
            oxygenation_min: Some(dec("12")),
            odor_level_max: Some("Moyen".into()),
            ..norm()
        };

        let report = generate_report("C-01", &[], Some(&norm));
        assert_eq!(report.norms.oxygenation_min, Some(dec("12")));
        assert_eq!(report.norms.odor_level_max.as_deref(), Some("Moyen"));
        assert_eq!(report.norms.temperature_max, None);
    }

    #[test]
    fn test_violations_keep_input_order() {
        let norm = Norm { compost_mass_max: Some(dec("100")), ..norm() };
        let readings = vec![
            Reading { compost_mass: Some(dec("150")), ..reading(20) },
            Reading { compost_mass: Some(dec("120")), ..reading(5) },
        ];

        let report = generate_report("C-01", &readings, Some(&norm));
        let dates: Vec<_> = report.violations.iter().map(|v| v.date).collect();
        assert_eq!(dates, vec![at(20), at(5)]);
    }

    #[test]
    fn test_violation_rows_flatten_details() {
        let norm = Norm {
            temperature_max: Some(dec("60")),
            oxygenation_min: Some(dec("10")),
            ..norm()
        };
        let readings = vec![Reading {
            temperature: Some(dec("70.5")),
            oxygenation: Some(dec("8")),
            ..reading(9)
        }];

        let rows = generate_report("C-01", &readings, Some(&norm)).violation_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-05-01 09:00");
        assert_eq!(rows[0].parameter, "Température");
        assert_eq!(rows[0].value, "70.5");
        assert_eq!(rows[1].parameter, "Oxygène");
        assert_eq!(rows[1].direction, "<");
    }

    #[test]
    fn test_input_requires_readings() {
        let input = ReportInput {
            composter_name: Some("C-01".into()),
            readings: None,
            norm: None,
        };
        assert_eq!(input.generate(), Err(ReportError::MissingReadings));
    }

    #[test]
    fn test_input_requires_composter_name() {
        let input = ReportInput {
            composter_name: Some("  ".into()),
            readings: Some(vec![]),
            norm: None,
        };
        assert_eq!(input.generate(), Err(ReportError::MissingComposterName));
    }

    #[test]
    fn test_input_from_json() {
        let json = r#"{"composter_name": "C-02", "readings": []}"#;
        let report = ReportInput::from_json(json).unwrap().generate().unwrap();
        assert_eq!(report.composter_name, "C-02");
        assert_eq!(report.total_records, 0);

        let json = r#"{"composter_name": "C-02", "readings": [{"temperature": 40}]}"#;
        assert!(matches!(ReportInput::from_json(json), Err(ReportError::Malformed(_))));
    }
}
