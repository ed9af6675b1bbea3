//! Norm service: per-composter threshold configuration

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{normalize_odor_text, Norm, NormRow};
use shared::validation::{
    validate_bound, validate_odor_bound, validate_percent, validate_quantity, validate_temperature,
};

/// Norm service
#[derive(Clone)]
pub struct NormService {
    db: PgPool,
}

/// Bounds of a norm; an absent bound leaves the parameter unconstrained
#[derive(Debug, Default, Deserialize)]
pub struct NormBoundsInput {
    pub temperature_max: Option<Decimal>,
    pub humidity_max: Option<Decimal>,
    pub compost_mass_max: Option<Decimal>,
    pub oxygenation_min: Option<Decimal>,
    pub wood_chips_added_max: Option<Decimal>,
    pub odor_level_max: Option<String>,
}

/// Input for creating a norm
#[derive(Debug, Deserialize)]
pub struct CreateNormInput {
    pub composter_id: Uuid,
    #[serde(flatten)]
    pub bounds: NormBoundsInput,
}

impl NormBoundsInput {
    /// Validate bounds and drop blank odor text
    pub fn normalized(mut self) -> AppResult<Self> {
        validate_bound(self.temperature_max)
            .and_then(|_| validate_temperature(self.temperature_max))
            .map_err(|m| {
                AppError::validation(
                    "temperature_max",
                    m,
                    "Le seuil de température doit être entre 0 et 9999.99",
                )
            })?;

        let percentages = [
            ("humidity_max", self.humidity_max),
            ("oxygenation_min", self.oxygenation_min),
        ];
        for (field, bound) in percentages {
            validate_percent(bound).map_err(|m| {
                AppError::validation(field, m, "Le seuil doit être entre 0 et 100")
            })?;
        }

        let quantities = [
            ("compost_mass_max", self.compost_mass_max),
            ("wood_chips_added_max", self.wood_chips_added_max),
        ];
        for (field, bound) in quantities {
            validate_quantity(bound).map_err(|m| {
                AppError::validation(
                    field,
                    m,
                    "Le seuil doit être positif et inférieur à 100000000",
                )
            })?;
        }

        self.odor_level_max = normalize_odor_text(self.odor_level_max);
        validate_odor_bound(self.odor_level_max.as_deref()).map_err(|m| {
            AppError::validation(
                "odor_level_max",
                m,
                "Le niveau d'odeur doit être Faible, Moyen, Fort ou Très fort",
            )
        })?;

        Ok(self)
    }
}

const NORM_COLUMNS: &str = "id, composter_id, temperature_max, humidity_max, compost_mass_max, \
                            oxygenation_min, wood_chips_added_max, odor_level_max, updated_at";

impl NormService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// The norm of a composter, if one is configured
    pub async fn find_for_composter(&self, composter_id: Uuid) -> AppResult<Option<Norm>> {
        let row = sqlx::query_as::<_, NormRow>(&format!(
            "SELECT {} FROM norms WHERE composter_id = $1",
            NORM_COLUMNS
        ))
        .bind(composter_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Norm::from))
    }

    /// The norm of a composter, 404 when none is configured
    pub async fn get_for_composter(&self, composter_id: Uuid) -> AppResult<Norm> {
        self.find_for_composter(composter_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Norm".to_string()))
    }

    /// Create the norm of a composter; a composter has at most one
    pub async fn create(&self, input: CreateNormInput) -> AppResult<Norm> {
        let bounds = input.bounds.normalized()?;

        let composter_exists =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM composters WHERE id = $1")
                .bind(input.composter_id)
                .fetch_one(&self.db)
                .await?;

        if composter_exists == 0 {
            return Err(AppError::validation(
                "composter_id",
                "Composter not found",
                "Composteur introuvable",
            ));
        }

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM norms WHERE composter_id = $1")
            .bind(input.composter_id)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "norm".to_string(),
                message: "This composter already has a norm".to_string(),
                message_fr: "Ce composteur a déjà une norme".to_string(),
            });
        }

        let row = sqlx::query_as::<_, NormRow>(&format!(
            r#"
            INSERT INTO norms (
                composter_id, temperature_max, humidity_max, compost_mass_max,
                oxygenation_min, wood_chips_added_max, odor_level_max
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            NORM_COLUMNS
        ))
        .bind(input.composter_id)
        .bind(bounds.temperature_max)
        .bind(bounds.humidity_max)
        .bind(bounds.compost_mass_max)
        .bind(bounds.oxygenation_min)
        .bind(bounds.wood_chips_added_max)
        .bind(&bounds.odor_level_max)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(norm_id = %row.id, composter_id = %row.composter_id, "Norm created");

        Ok(row.into())
    }

    /// Replace every bound of a norm
    pub async fn update(&self, id: Uuid, bounds: NormBoundsInput) -> AppResult<Norm> {
        let bounds = bounds.normalized()?;

        let row = sqlx::query_as::<_, NormRow>(&format!(
            r#"
            UPDATE norms SET
                temperature_max = $2,
                humidity_max = $3,
                compost_mass_max = $4,
                oxygenation_min = $5,
                wood_chips_added_max = $6,
                odor_level_max = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            NORM_COLUMNS
        ))
        .bind(id)
        .bind(bounds.temperature_max)
        .bind(bounds.humidity_max)
        .bind(bounds.compost_mass_max)
        .bind(bounds.oxygenation_min)
        .bind(bounds.wood_chips_added_max)
        .bind(&bounds.odor_level_max)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Norm".to_string()))?;

        tracing::info!(norm_id = %id, "Norm updated");

        Ok(row.into())
    }
}
