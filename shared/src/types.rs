//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates only when both components are known
    pub fn from_parts(latitude: Option<Decimal>, longitude: Option<Decimal>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// Label rendered wherever a value could not be computed or was never recorded
pub const NOT_APPLICABLE: &str = "N/A";

/// Display name used when the recording user is unknown
pub const UNKNOWN_USER: &str = "Inconnu";
