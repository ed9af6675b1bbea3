//! HTTP handlers

pub mod admin;
pub mod auth;
pub mod composter;
pub mod health;
pub mod norm;
pub mod notification;
pub mod reading;
pub mod report;
pub mod site;

pub use admin::*;
pub use auth::*;
pub use composter::*;
pub use health::*;
pub use norm::*;
pub use notification::*;
pub use reading::*;
pub use report::*;
pub use site::*;

use crate::error::AppError;

/// Fallback for unknown routes
pub async fn not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}
