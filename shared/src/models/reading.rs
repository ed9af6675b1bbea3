//! Sensor reading models and the odor level scale

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::norm::Parameter;
use crate::types::UNKNOWN_USER;

/// One sensor observation for a composter.
///
/// Every measured field is optional: a supervisor records whatever was
/// measured at that visit, and an absent value is never the same as zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub id: Uuid,
    pub composter_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<Recorder>,
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    /// Raw odor text as entered; interpreted through [`OdorLevel`]
    pub odor_level: Option<String>,
    pub compost_mass: Option<Decimal>,
    pub oxygenation: Option<Decimal>,
    #[serde(default)]
    pub dry_matter: bool,
    pub wood_chips_added: Option<Decimal>,
}

/// The user who recorded a reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recorder {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

impl Recorder {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Reading {
    /// Numeric value of a parameter, `None` for the odor level
    pub fn measure(&self, parameter: Parameter) -> Option<Decimal> {
        match parameter {
            Parameter::Temperature => self.temperature,
            Parameter::Humidity => self.humidity,
            Parameter::CompostMass => self.compost_mass,
            Parameter::Oxygenation => self.oxygenation,
            Parameter::WoodChipsAdded => self.wood_chips_added,
            Parameter::OdorLevel => None,
        }
    }

    /// Odor level on the scale, `None` when absent or unrecognized
    pub fn odor(&self) -> Option<OdorLevel> {
        self.odor_level.as_deref().and_then(OdorLevel::from_label)
    }

    /// Name of the recording user, or "Inconnu"
    pub fn recorder_name(&self) -> String {
        self.recorded_by
            .as_ref()
            .map(Recorder::display_name)
            .unwrap_or_else(|| UNKNOWN_USER.to_string())
    }
}

/// Qualitative odor scale, weakest first
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OdorLevel {
    #[serde(rename = "Faible")]
    Faible,
    #[serde(rename = "Moyen")]
    Moyen,
    #[serde(rename = "Fort")]
    Fort,
    #[serde(rename = "Très fort")]
    TresFort,
}

impl OdorLevel {
    /// The full ladder in rank order
    pub const ALL: [OdorLevel; 4] = [
        OdorLevel::Faible,
        OdorLevel::Moyen,
        OdorLevel::Fort,
        OdorLevel::TresFort,
    ];

    pub fn rank(self) -> u8 {
        match self {
            OdorLevel::Faible => 0,
            OdorLevel::Moyen => 1,
            OdorLevel::Fort => 2,
            OdorLevel::TresFort => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OdorLevel::Faible => "Faible",
            OdorLevel::Moyen => "Moyen",
            OdorLevel::Fort => "Fort",
            OdorLevel::TresFort => "Très fort",
        }
    }

    /// Parse a canonical label, matched exactly. Anything outside the ladder yields `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label)
    }

    /// Whether this level is strictly stronger than `bound`
    pub fn exceeds(self, bound: OdorLevel) -> bool {
        self.rank() > bound.rank()
    }
}

impl std::fmt::Display for OdorLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Normalize optional odor text: blank input means "not measured"
pub fn normalize_odor_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
