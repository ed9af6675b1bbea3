//! Site handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Action, Site};
use crate::services::site::{ComposterStat, CreateSiteInput, SiteWithComposters};
use crate::services::SiteService;
use crate::AppState;

/// List the sites visible to the current user
pub async fn list_sites(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<SiteWithComposters>>> {
    user.require(Action::ViewSites)?;
    let service = SiteService::new(state.db.clone());
    Ok(Json(service.list_for(&user).await?))
}

/// Create a site
pub async fn create_site(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateSiteInput>,
) -> AppResult<(StatusCode, Json<Site>)> {
    user.require(Action::ManageSites)?;
    let service = SiteService::new(state.db.clone());
    let site = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(site)))
}

/// Delete a site
pub async fn delete_site(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(site_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Action::ManageSites)?;
    let service = SiteService::new(state.db.clone());
    service.delete(site_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Every composter with its site name
pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ComposterStat>>> {
    user.require(Action::ViewSites)?;
    let service = SiteService::new(state.db.clone());
    Ok(Json(service.stats().await?))
}
