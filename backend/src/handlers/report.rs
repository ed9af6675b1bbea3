//! Report handlers

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::Action;
use crate::services::report::VIOLATION_CSV_HEADERS;
use crate::services::ReportService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// Get the report of a composter
pub async fn get_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(composter_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    user.require(Action::ViewReport)?;
    let service = ReportService::new(state.db.clone());
    let report = service.composter_report(&user, composter_id).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportService::export_to_csv(&VIOLATION_CSV_HEADERS, &report.violation_rows())?;
        let disposition = format!("attachment; filename=\"report_{}.csv\"", composter_id);
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}
