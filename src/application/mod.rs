//! Application Layer
//!
//! Use cases exposed to the inbound adapters.

mod catalog_service;
mod health_service;

pub use catalog_service::CatalogService;
pub use health_service::HealthService;
