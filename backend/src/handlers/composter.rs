//! Composter handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Action, Composter};
use crate::services::composter::{ComposterDetail, CreateComposterInput};
use crate::services::ComposterService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ComposterQuery {
    /// Only keep readings from the last N days
    pub days: Option<i64>,
}

/// Get a composter with its site, norm and readings
pub async fn get_composter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(composter_id): Path<Uuid>,
    Query(query): Query<ComposterQuery>,
) -> AppResult<Json<ComposterDetail>> {
    user.require(Action::ViewComposter)?;
    let service = ComposterService::new(state.db.clone());
    let detail = service.detail(&user, composter_id, query.days).await?;
    Ok(Json(detail))
}

/// Create a composter
pub async fn create_composter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateComposterInput>,
) -> AppResult<(StatusCode, Json<Composter>)> {
    user.require(Action::ManageComposters)?;
    let service = ComposterService::new(state.db.clone());
    let composter = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(composter)))
}

/// Delete a composter
pub async fn delete_composter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(composter_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Action::ManageComposters)?;
    let service = ComposterService::new(state.db.clone());
    service.delete(composter_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
