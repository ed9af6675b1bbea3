//! Shared types and models for the Compost Monitoring Platform
//!
//! This crate contains the domain model and the report computation shared
//! between the backend, the browser front-end (via WASM), and tests.

pub mod models;
pub mod report;
pub mod types;
pub mod validation;

pub use models::*;
pub use report::*;
pub use types::*;
pub use validation::*;
