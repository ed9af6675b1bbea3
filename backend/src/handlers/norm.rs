//! Norm handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Action, Norm};
use crate::services::norm::{CreateNormInput, NormBoundsInput};
use crate::services::{ComposterService, NormService};
use crate::AppState;

/// Get the norm of a composter
pub async fn get_norm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(composter_id): Path<Uuid>,
) -> AppResult<Json<Norm>> {
    user.require(Action::ViewComposter)?;
    ComposterService::new(state.db.clone())
        .get_visible(&user, composter_id)
        .await?;

    let service = NormService::new(state.db.clone());
    Ok(Json(service.get_for_composter(composter_id).await?))
}

/// Create the norm of a composter
pub async fn create_norm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreateNormInput>,
) -> AppResult<(StatusCode, Json<Norm>)> {
    user.require(Action::ManageNorms)?;
    let service = NormService::new(state.db.clone());
    let norm = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(norm)))
}

/// Replace the bounds of a norm
pub async fn update_norm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(norm_id): Path<Uuid>,
    Json(input): Json<NormBoundsInput>,
) -> AppResult<Json<Norm>> {
    user.require(Action::ManageNorms)?;
    let service = NormService::new(state.db.clone());
    Ok(Json(service.update(norm_id, input).await?))
}
