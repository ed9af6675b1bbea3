//! HTTP handlers for in-app notifications

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{Action, Notification};
use crate::services::NotificationService;
use crate::AppState;

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Get the current user's notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    user.require(Action::ViewNotifications)?;
    let service = NotificationService::new(state.db.clone());
    Ok(Json(service.list_for(user.user_id).await?))
}

/// Mark a notification as read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<Json<Notification>> {
    user.require(Action::ViewNotifications)?;
    let service = NotificationService::new(state.db.clone());
    Ok(Json(service.mark_read(user.user_id, notification_id).await?))
}

/// Number of unread notifications
pub async fn unread_count(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<UnreadCountResponse>> {
    user.require(Action::ViewNotifications)?;
    let service = NotificationService::new(state.db.clone());
    let count = service.unread_count(user.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}
