//! Composter service: composter detail, creation, deletion and visibility

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Composter, ComposterRow, Norm, Reading};
use crate::services::{NormService, ReadingService};
use shared::validation::validate_name;

/// Composter service
#[derive(Clone)]
pub struct ComposterService {
    db: PgPool,
}

/// Short reference to a site
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SiteRef {
    pub id: Uuid,
    pub name: String,
}

/// Composter page: site, norm and readings in chronological order
#[derive(Debug, Serialize)]
pub struct ComposterDetail {
    #[serde(flatten)]
    pub composter: Composter,
    pub site: SiteRef,
    pub norm: Option<Norm>,
    pub readings: Vec<Reading>,
}

/// Input for creating a composter
#[derive(Debug, Deserialize)]
pub struct CreateComposterInput {
    pub name: String,
    pub site_id: Uuid,
}

impl ComposterService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a composter by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Composter> {
        let row = sqlx::query_as::<_, ComposterRow>(
            "SELECT id, site_id, name, created_at FROM composters WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Composter".to_string()))?;

        Ok(row.into())
    }

    /// Whether a user has been assigned a composter
    pub async fn is_assigned(&self, user_id: Uuid, composter_id: Uuid) -> AppResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM composter_assignments WHERE user_id = $1 AND composter_id = $2",
        )
        .bind(user_id)
        .bind(composter_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count > 0)
    }

    /// Load a composter the caller is allowed to see.
    ///
    /// Missing composters are 404; non-admin callers without an assignment get 403.
    pub async fn get_visible(&self, user: &AuthUser, id: Uuid) -> AppResult<Composter> {
        let composter = self.get(id).await?;

        if !user.role.sees_all_composters() && !self.is_assigned(user.user_id, id).await? {
            return Err(AppError::Forbidden {
                message: "You are not assigned to this composter".to_string(),
                message_fr: "Vous n'êtes pas affecté à ce composteur".to_string(),
            });
        }

        Ok(composter)
    }

    /// Composter detail with its site, norm and readings.
    ///
    /// `days` keeps only readings from the last N days.
    pub async fn detail(
        &self,
        user: &AuthUser,
        id: Uuid,
        days: Option<i64>,
    ) -> AppResult<ComposterDetail> {
        let composter = self.get_visible(user, id).await?;

        let site = sqlx::query_as::<_, SiteRef>("SELECT id, name FROM sites WHERE id = $1")
            .bind(composter.site_id)
            .fetch_one(&self.db)
            .await?;

        let norm = NormService::new(self.db.clone())
            .find_for_composter(id)
            .await?;

        let since = reading_window_start(Utc::now(), days)?;
        let readings = ReadingService::new(self.db.clone())
            .list_for_composter(id, since)
            .await?;

        Ok(ComposterDetail {
            composter,
            site,
            norm,
            readings,
        })
    }

    /// Create a composter on an existing site
    pub async fn create(&self, input: CreateComposterInput) -> AppResult<Composter> {
        validate_name(&input.name)
            .map_err(|m| AppError::validation("name", m, "Le nom du composteur est requis"))?;

        let site_exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sites WHERE id = $1")
            .bind(input.site_id)
            .fetch_one(&self.db)
            .await?;

        if site_exists == 0 {
            return Err(AppError::validation(
                "site_id",
                "Site not found",
                "Site introuvable",
            ));
        }

        let row = sqlx::query_as::<_, ComposterRow>(
            r#"
            INSERT INTO composters (site_id, name)
            VALUES ($1, $2)
            RETURNING id, site_id, name, created_at
            "#,
        )
        .bind(input.site_id)
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;

        tracing::info!(composter_id = %row.id, site_id = %row.site_id, "Composter created");

        Ok(row.into())
    }

    /// Delete a composter with its readings, norm and assignments
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM composters WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Composter".to_string()));
        }

        tracing::info!(composter_id = %id, "Composter deleted");
        Ok(())
    }
}

/// Start of the reading window for a `days` filter
pub fn reading_window_start(
    now: DateTime<Utc>,
    days: Option<i64>,
) -> AppResult<Option<DateTime<Utc>>> {
    match days {
        None => Ok(None),
        Some(days) if days > 0 => Duration::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .map(Some)
            .ok_or_else(|| {
                AppError::validation(
                    "days",
                    "days is too large",
                    "Le nombre de jours est trop grand",
                )
            }),
        Some(_) => Err(AppError::validation(
            "days",
            "days must be a positive number",
            "Le nombre de jours doit être positif",
        )),
    }
}
