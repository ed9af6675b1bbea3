//! Business logic services for the Compost Monitoring Platform

pub mod admin;
pub mod auth;
pub mod composter;
pub mod norm;
pub mod notification;
pub mod reading;
pub mod report;
pub mod site;

pub use admin::AdminService;
pub use auth::AuthService;
pub use composter::ComposterService;
pub use norm::NormService;
pub use notification::NotificationService;
pub use reading::ReadingService;
pub use report::ReportService;
pub use site::SiteService;
