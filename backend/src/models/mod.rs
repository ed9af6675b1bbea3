//! Database models for the Compost Monitoring Platform
//!
//! Re-exports models from the shared crate and adds the row types sqlx maps into them

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;
use shared::types::GpsCoordinates;

use crate::error::{AppError, AppResult};

fn parse_role(value: &str) -> AppResult<Role> {
    Role::parse(value).ok_or_else(|| AppError::Internal(format!("Unknown role in database: {}", value)))
}

/// User account row
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> AppResult<User> {
        Ok(User {
            id: self.id,
            role: parse_role(&self.role)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            created_at: self.created_at,
        })
    }
}

/// Site row joined with its optional supervisor
#[derive(Debug, FromRow)]
pub struct SiteRow {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub supervisor_id: Option<Uuid>,
    pub supervisor_first_name: Option<String>,
    pub supervisor_last_name: Option<String>,
    pub supervisor_role: Option<String>,
}

impl SiteRow {
    pub fn into_site(self) -> AppResult<Site> {
        let supervisor = match (
            self.supervisor_id,
            self.supervisor_first_name,
            self.supervisor_last_name,
            self.supervisor_role,
        ) {
            (Some(id), Some(first_name), Some(last_name), Some(role)) => Some(UserSummary {
                id,
                first_name,
                last_name,
                role: parse_role(&role)?,
            }),
            _ => None,
        };

        Ok(Site {
            id: self.id,
            name: self.name,
            address: self.address,
            coordinates: GpsCoordinates::from_parts(self.latitude, self.longitude),
            supervisor,
            created_at: self.created_at,
        })
    }
}

/// Composter row
#[derive(Debug, FromRow)]
pub struct ComposterRow {
    pub id: Uuid,
    pub site_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<ComposterRow> for Composter {
    fn from(row: ComposterRow) -> Self {
        Composter {
            id: row.id,
            site_id: row.site_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Reading row joined with the recording user
#[derive(Debug, FromRow)]
pub struct ReadingRow {
    pub id: Uuid,
    pub composter_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: Option<Uuid>,
    pub recorder_first_name: Option<String>,
    pub recorder_last_name: Option<String>,
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub odor_level: Option<String>,
    pub compost_mass: Option<Decimal>,
    pub oxygenation: Option<Decimal>,
    pub dry_matter: bool,
    pub wood_chips_added: Option<Decimal>,
}

impl From<ReadingRow> for Reading {
    fn from(row: ReadingRow) -> Self {
        let recorded_by = match (row.recorded_by, row.recorder_first_name, row.recorder_last_name) {
            (Some(id), Some(first_name), Some(last_name)) => Some(Recorder {
                id,
                first_name,
                last_name,
            }),
            _ => None,
        };

        Reading {
            id: row.id,
            composter_id: row.composter_id,
            recorded_at: row.recorded_at,
            recorded_by,
            temperature: row.temperature,
            humidity: row.humidity,
            odor_level: row.odor_level,
            compost_mass: row.compost_mass,
            oxygenation: row.oxygenation,
            dry_matter: row.dry_matter,
            wood_chips_added: row.wood_chips_added,
        }
    }
}

/// Norm row
#[derive(Debug, FromRow)]
pub struct NormRow {
    pub id: Uuid,
    pub composter_id: Uuid,
    pub temperature_max: Option<Decimal>,
    pub humidity_max: Option<Decimal>,
    pub compost_mass_max: Option<Decimal>,
    pub oxygenation_min: Option<Decimal>,
    pub wood_chips_added_max: Option<Decimal>,
    pub odor_level_max: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<NormRow> for Norm {
    fn from(row: NormRow) -> Self {
        Norm {
            id: row.id,
            composter_id: row.composter_id,
            temperature_max: row.temperature_max,
            humidity_max: row.humidity_max,
            compost_mass_max: row.compost_mass_max,
            oxygenation_min: row.oxygenation_min,
            wood_chips_added_max: row.wood_chips_added_max,
            odor_level_max: row.odor_level_max,
            updated_at: row.updated_at,
        }
    }
}

/// Notification row
#[derive(Debug, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub composter_id: Option<Uuid>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            composter_id: row.composter_id,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}
