//! Site service for composting sites and the dashboard overview

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{Composter, ComposterRow, Site, SiteRow};
use shared::validation::{validate_coordinates, validate_name};

/// Site service
#[derive(Clone)]
pub struct SiteService {
    db: PgPool,
}

/// A site with the composters visible to the caller
#[derive(Debug, Clone, Serialize)]
pub struct SiteWithComposters {
    #[serde(flatten)]
    pub site: Site,
    pub composters: Vec<Composter>,
}

/// Input for creating a site
#[derive(Debug, Deserialize)]
pub struct CreateSiteInput {
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub supervisor_id: Option<Uuid>,
}

/// Composter listed on the statistics page
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ComposterStat {
    pub id: Uuid,
    pub name: String,
    pub site_id: Uuid,
    pub site_name: String,
}

const SITE_SELECT: &str = r#"
    SELECT s.id, s.name, s.address, s.latitude, s.longitude, s.created_at,
           u.id AS supervisor_id, u.first_name AS supervisor_first_name,
           u.last_name AS supervisor_last_name, u.role AS supervisor_role
    FROM sites s
    LEFT JOIN users u ON u.id = s.supervisor_id
"#;

impl SiteService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List sites with their composters.
    ///
    /// Administrators see everything. Other users only see sites holding a
    /// composter assigned to them, and only those composters.
    pub async fn list_for(&self, user: &AuthUser) -> AppResult<Vec<SiteWithComposters>> {
        let (site_rows, composter_rows) = if user.role.sees_all_composters() {
            let sites = sqlx::query_as::<_, SiteRow>(&format!("{} ORDER BY s.name", SITE_SELECT))
                .fetch_all(&self.db)
                .await?;

            let composters = sqlx::query_as::<_, ComposterRow>(
                "SELECT id, site_id, name, created_at FROM composters ORDER BY name",
            )
            .fetch_all(&self.db)
            .await?;

            (sites, composters)
        } else {
            let composters = sqlx::query_as::<_, ComposterRow>(
                r#"
                SELECT c.id, c.site_id, c.name, c.created_at
                FROM composters c
                JOIN composter_assignments a ON a.composter_id = c.id
                WHERE a.user_id = $1
                ORDER BY c.name
                "#,
            )
            .bind(user.user_id)
            .fetch_all(&self.db)
            .await?;

            let sites = sqlx::query_as::<_, SiteRow>(&format!(
                r#"{}
                WHERE s.id IN (
                    SELECT c.site_id FROM composters c
                    JOIN composter_assignments a ON a.composter_id = c.id
                    WHERE a.user_id = $1
                )
                ORDER BY s.name"#,
                SITE_SELECT
            ))
            .bind(user.user_id)
            .fetch_all(&self.db)
            .await?;

            (sites, composters)
        };

        let sites = site_rows
            .into_iter()
            .map(SiteRow::into_site)
            .collect::<AppResult<Vec<_>>>()?;
        let composters = composter_rows.into_iter().map(Composter::from).collect();

        Ok(group_composters(sites, composters, !user.role.sees_all_composters()))
    }

    /// Create a new site
    pub async fn create(&self, input: CreateSiteInput) -> AppResult<Site> {
        validate_name(&input.name)
            .map_err(|m| AppError::validation("name", m, "Le nom du site est requis"))?;

        match (input.latitude, input.longitude) {
            (Some(latitude), Some(longitude)) => validate_coordinates(latitude, longitude)
                .map_err(|m| AppError::validation("coordinates", m, "Coordonnées GPS invalides"))?,
            (None, None) => {}
            _ => {
                return Err(AppError::validation(
                    "coordinates",
                    "Latitude and longitude must be given together",
                    "La latitude et la longitude vont ensemble",
                ))
            }
        }

        if let Some(supervisor_id) = input.supervisor_id {
            let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE id = $1")
                .bind(supervisor_id)
                .fetch_one(&self.db)
                .await?;

            if exists == 0 {
                return Err(AppError::validation(
                    "supervisor_id",
                    "Supervisor not found",
                    "Superviseur introuvable",
                ));
            }
        }

        let address = input
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sites (name, address, latitude, longitude, supervisor_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&address)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.supervisor_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(site_id = %id, "Site created");

        self.get(id).await
    }

    /// Get a site by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Site> {
        sqlx::query_as::<_, SiteRow>(&format!("{} WHERE s.id = $1", SITE_SELECT))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Site".to_string()))?
            .into_site()
    }

    /// Delete a site and, through the schema, its composters
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sites WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Site".to_string()));
        }

        tracing::info!(site_id = %id, "Site deleted");
        Ok(())
    }

    /// Every composter with its site name
    pub async fn stats(&self) -> AppResult<Vec<ComposterStat>> {
        let stats = sqlx::query_as::<_, ComposterStat>(
            r#"
            SELECT c.id, c.name, s.id AS site_id, s.name AS site_name
            FROM composters c
            JOIN sites s ON s.id = c.site_id
            ORDER BY s.name, c.name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(stats)
    }
}

/// Attach composters to their sites, keeping site order.
///
/// With `drop_empty`, sites left without a composter are omitted.
pub fn group_composters(
    sites: Vec<Site>,
    composters: Vec<Composter>,
    drop_empty: bool,
) -> Vec<SiteWithComposters> {
    let mut by_site: HashMap<Uuid, Vec<Composter>> = HashMap::new();
    for composter in composters {
        by_site.entry(composter.site_id).or_default().push(composter);
    }

    sites
        .into_iter()
        .map(|site| {
            let composters = by_site.remove(&site.id).unwrap_or_default();
            SiteWithComposters { site, composters }
        })
        .filter(|s| !drop_empty || !s.composters.is_empty())
        .collect()
}
