//! Static Flag Evaluator
//!
//! Implements FlagEvaluator with fixed, in-process flag values.
//! Used when no flag backend is configured.

use crate::domain::ports::FlagEvaluator;
use async_trait::async_trait;
use std::collections::HashMap;

/// In-memory flag table. Unknown flags evaluate to the caller's default.
#[derive(Debug, Clone, Default)]
pub struct StaticFlagEvaluator {
    flags: HashMap<String, bool>,
}

impl StaticFlagEvaluator {
    /// An evaluator with no flags set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag value.
    pub fn with_flag(mut self, flag_key: impl Into<String>, value: bool) -> Self {
        self.flags.insert(flag_key.into(), value);
        self
    }
}

#[async_trait]
impl FlagEvaluator for StaticFlagEvaluator {
    async fn evaluate_bool(&self, flag_key: &str, default: bool) -> bool {
        self.flags.get(flag_key).copied().unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_flag_uses_default() {
        let flags = StaticFlagEvaluator::new();
        assert!(!flags.evaluate_bool("productCatalogFailure", false).await);
        assert!(flags.evaluate_bool("productCatalogFailure", true).await);
    }

    #[tokio::test]
    async fn test_configured_flag_overrides_default() {
        let flags = StaticFlagEvaluator::new()
            .with_flag("productCatalogFailure", true)
            .with_flag("other", false);
        assert!(flags.evaluate_bool("productCatalogFailure", false).await);
        assert!(!flags.evaluate_bool("other", true).await);
    }
}
