//! Health Service
//!
//! Answers health probes. The catalog never degrades once loaded, so
//! there is no not-serving state to report.

use crate::domain::errors::CatalogError;
use crate::domain::value_objects::ServingStatus;

/// Health responder for liveness/readiness probes.
#[derive(Debug, Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Report the status of `service` (empty for the whole server).
    pub fn check(&self, service: &str) -> ServingStatus {
        tracing::trace!("health check for {:?}", service);
        ServingStatus::Serving
    }

    /// Streaming health updates are not supported.
    pub fn watch(&self, _service: &str) -> Result<ServingStatus, CatalogError> {
        Err(CatalogError::Unimplemented(
            "health check via Watch not implemented".to_string(),
        ))
    }
}
