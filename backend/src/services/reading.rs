//! Reading service: recording, correcting and deleting composter readings
//!
//! A new reading is checked against the composter's norm straight away, and
//! every user assigned to the composter is notified when a bound is broken.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{normalize_odor_text, violation_message, Reading, ReadingRow, ViolationDetail};
use crate::services::{ComposterService, NormService, NotificationService};
use shared::validation::{
    validate_odor_text, validate_percent, validate_quantity, validate_temperature,
};

/// Reading service
#[derive(Clone)]
pub struct ReadingService {
    db: PgPool,
}

/// Measured fields of a reading; every field is optional
#[derive(Debug, Default, Deserialize)]
pub struct ReadingInput {
    pub temperature: Option<Decimal>,
    pub humidity: Option<Decimal>,
    pub odor_level: Option<String>,
    pub compost_mass: Option<Decimal>,
    pub oxygenation: Option<Decimal>,
    pub dry_matter: Option<bool>,
    pub wood_chips_added: Option<Decimal>,
}

impl ReadingInput {
    /// Check measured values and turn blank odor text into "not recorded"
    pub fn normalized(mut self) -> AppResult<Self> {
        validate_temperature(self.temperature).map_err(|m| {
            AppError::validation(
                "temperature",
                m,
                "La température doit être entre -9999.99 et 9999.99",
            )
        })?;
        validate_percent(self.humidity)
            .map_err(|m| AppError::validation("humidity", m, "L'humidité doit être entre 0 et 100"))?;
        validate_percent(self.oxygenation).map_err(|m| {
            AppError::validation("oxygenation", m, "L'oxygène doit être entre 0 et 100")
        })?;
        validate_quantity(self.compost_mass).map_err(|m| {
            AppError::validation(
                "compost_mass",
                m,
                "La masse doit être positive et inférieure à 100000000",
            )
        })?;
        validate_quantity(self.wood_chips_added).map_err(|m| {
            AppError::validation(
                "wood_chips_added",
                m,
                "Les copeaux ajoutés doivent être positifs et inférieurs à 100000000",
            )
        })?;

        self.odor_level = normalize_odor_text(self.odor_level);
        validate_odor_text(self.odor_level.as_deref()).map_err(|m| {
            AppError::validation(
                "odor_level",
                m,
                "Le niveau d'odeur ne doit pas dépasser 40 caractères",
            )
        })?;
        Ok(self)
    }
}

/// A freshly recorded reading with the bounds it broke
#[derive(Debug, Serialize)]
pub struct RecordedReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub violations: Vec<ViolationDetail>,
}

/// Alert text for a reading, `None` when it broke no bound
fn alert_message(composter_name: &str, violations: &[ViolationDetail]) -> Option<String> {
    (!violations.is_empty()).then(|| violation_message(composter_name, violations))
}

const READING_SELECT: &str = r#"
    SELECT r.id, r.composter_id, r.recorded_at, r.recorded_by,
           u.first_name AS recorder_first_name, u.last_name AS recorder_last_name,
           r.temperature, r.humidity, r.odor_level, r.compost_mass, r.oxygenation,
           r.dry_matter, r.wood_chips_added
    FROM readings r
    LEFT JOIN users u ON u.id = r.recorded_by
"#;

impl ReadingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Readings of a composter in chronological order, optionally since a date
    pub async fn list_for_composter(
        &self,
        composter_id: Uuid,
        since: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Reading>> {
        let rows = sqlx::query_as::<_, ReadingRow>(&format!(
            r#"{}
            WHERE r.composter_id = $1
              AND ($2::timestamptz IS NULL OR r.recorded_at >= $2)
            ORDER BY r.recorded_at ASC"#,
            READING_SELECT
        ))
        .bind(composter_id)
        .bind(since)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Reading::from).collect())
    }

    /// Get a reading by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Reading> {
        let row = sqlx::query_as::<_, ReadingRow>(&format!("{} WHERE r.id = $1", READING_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Reading".to_string()))?;

        Ok(row.into())
    }

    /// Composter a reading belongs to
    pub async fn composter_of(&self, id: Uuid) -> AppResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT composter_id FROM readings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Reading".to_string()))
    }

    /// Record a reading stamped now, then check it against the composter norm.
    ///
    /// The reading and the alerts it raises are committed together.
    pub async fn record(
        &self,
        composter_id: Uuid,
        recorded_by: Uuid,
        input: ReadingInput,
    ) -> AppResult<RecordedReading> {
        let input = input.normalized()?;
        let composter = ComposterService::new(self.db.clone()).get(composter_id).await?;
        let norm = NormService::new(self.db.clone())
            .find_for_composter(composter_id)
            .await?;

        let mut tx = self.db.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO readings (
                composter_id, recorded_at, recorded_by, temperature, humidity, odor_level,
                compost_mass, oxygenation, dry_matter, wood_chips_added
            )
            VALUES ($1, NOW(), $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(composter_id)
        .bind(recorded_by)
        .bind(input.temperature)
        .bind(input.humidity)
        .bind(&input.odor_level)
        .bind(input.compost_mass)
        .bind(input.oxygenation)
        .bind(input.dry_matter.unwrap_or(false))
        .bind(input.wood_chips_added)
        .fetch_one(&mut *tx)
        .await?;

        let reading: Reading =
            sqlx::query_as::<_, ReadingRow>(&format!("{} WHERE r.id = $1", READING_SELECT))
                .bind(id)
                .fetch_one(&mut *tx)
                .await?
                .into();

        let violations = norm
            .map(|norm| norm.violations(&reading))
            .unwrap_or_default();

        if let Some(message) = alert_message(&composter.name, &violations) {
            tracing::warn!(
                composter_id = %composter_id,
                count = violations.len(),
                "Reading out of norm"
            );
            NotificationService::notify_assigned(&mut *tx, composter_id, &message).await?;
        }

        tx.commit().await?;
        tracing::info!(reading_id = %id, composter_id = %composter_id, "Reading recorded");

        Ok(RecordedReading {
            reading,
            violations,
        })
    }

    /// Correct the measured fields of a reading; absent fields are kept
    pub async fn update(&self, id: Uuid, input: ReadingInput) -> AppResult<Reading> {
        let input = input.normalized()?;

        let result = sqlx::query(
            r#"
            UPDATE readings SET
                temperature = COALESCE($2, temperature),
                humidity = COALESCE($3, humidity),
                odor_level = COALESCE($4, odor_level),
                compost_mass = COALESCE($5, compost_mass),
                oxygenation = COALESCE($6, oxygenation),
                dry_matter = COALESCE($7, dry_matter),
                wood_chips_added = COALESCE($8, wood_chips_added)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(input.temperature)
        .bind(input.humidity)
        .bind(&input.odor_level)
        .bind(input.compost_mass)
        .bind(input.oxygenation)
        .bind(input.dry_matter)
        .bind(input.wood_chips_added)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reading".to_string()));
        }

        tracing::info!(reading_id = %id, "Reading updated");
        self.get(id).await
    }

    /// Delete a reading
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM readings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Reading".to_string()));
        }

        tracing::info!(reading_id = %id, "Reading deleted");
        Ok(())
    }
}
