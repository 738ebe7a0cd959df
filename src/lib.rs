//! Product Catalog Library
//!
//! This module exposes the product catalog components for use in integration
//! tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::{CatalogService, HealthService};
pub use config::{load_config, Config, LogConfig};
pub use domain::entities::{Money, Product};
pub use domain::errors::CatalogError;
pub use domain::ports::{FaultDraw, FlagEvaluator, ProductSource};
pub use domain::services::{CatalogStore, FailureConfig, FaultInjector};
pub use domain::value_objects::{CrashPolicy, FailureRate, ServiceState, ServingStatus};
pub use infrastructure::Lifecycle;
