//! Domain models for the Compost Monitoring Platform

mod norm;
mod notification;
mod reading;
mod site;
mod user;

pub use norm::*;
pub use notification::*;
pub use reading::*;
pub use site::*;
pub use user::*;
