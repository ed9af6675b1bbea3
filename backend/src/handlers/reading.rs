//! Reading handlers
//!
//! Recording and correcting readings needs the role grant and, for
//! non-admin users, an assignment to the composter.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Action, Reading};
use crate::services::reading::{ReadingInput, RecordedReading};
use crate::services::{ComposterService, ReadingService};
use crate::AppState;

/// Record a reading for a composter
pub async fn create_reading(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(composter_id): Path<Uuid>,
    Json(input): Json<ReadingInput>,
) -> AppResult<(StatusCode, Json<RecordedReading>)> {
    user.require(Action::RecordReading)?;
    ComposterService::new(state.db.clone())
        .get_visible(&user, composter_id)
        .await?;

    let service = ReadingService::new(state.db.clone());
    let recorded = service.record(composter_id, user.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

/// Correct a reading
pub async fn update_reading(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(reading_id): Path<Uuid>,
    Json(input): Json<ReadingInput>,
) -> AppResult<Json<Reading>> {
    user.require(Action::EditReading)?;
    let service = ReadingService::new(state.db.clone());

    let composter_id = service.composter_of(reading_id).await?;
    ComposterService::new(state.db.clone())
        .get_visible(&user, composter_id)
        .await?;

    Ok(Json(service.update(reading_id, input).await?))
}

/// Delete a reading
pub async fn delete_reading(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(reading_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require(Action::DeleteReading)?;
    let service = ReadingService::new(state.db.clone());

    let composter_id = service.composter_of(reading_id).await?;
    ComposterService::new(state.db.clone())
        .get_visible(&user, composter_id)
        .await?;

    service.delete(reading_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
