//! Composting site and composter models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;
use crate::types::GpsCoordinates;

/// A composting site hosting one or more composters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub coordinates: Option<GpsCoordinates>,
    pub supervisor: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

/// A physical composting unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composter {
    pub id: Uuid,
    pub site_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
