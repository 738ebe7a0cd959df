//! Domain Layer
//!
//! Entities, value objects, ports and pure services of the catalog.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{Money, Product};
pub use errors::CatalogError;
pub use value_objects::{CrashPolicy, FailureRate, ServiceState, ServingStatus};
