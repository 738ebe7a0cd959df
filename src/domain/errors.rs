//! Domain Errors
//!
//! Recoverable failures returned to callers. The simulated crash is not
//! part of this taxonomy; see `domain::services::SimulatedCrash`.

/// Errors returned by catalog and health operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Requested product id is not in the catalog.
    #[error("Product Not Found: {0}")]
    NotFound(String),
    /// Deliberate degradation (flag-gated failure).
    #[error("{0}")]
    Internal(String),
    /// Operation is never supported.
    #[error("{0}")]
    Unimplemented(String),
    /// Service is not accepting new requests.
    #[error("{0}")]
    Unavailable(String),
}

impl CatalogError {
    /// Stable machine-readable code for the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::Unimplemented(_) => "unimplemented",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_carries_id() {
        let err = CatalogError::NotFound("C".to_string());
        assert_eq!(err.to_string(), "Product Not Found: C");
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_codes() {
        assert_eq!(CatalogError::Internal("x".into()).code(), "internal");
        assert_eq!(CatalogError::Unimplemented("x".into()).code(), "unimplemented");
        assert_eq!(CatalogError::Unavailable("x".into()).code(), "unavailable");
    }

    #[test]
    fn test_internal_message_verbatim() {
        let err = CatalogError::Internal("Error: boom".to_string());
        assert_eq!(err.to_string(), "Error: boom");
    }
}
