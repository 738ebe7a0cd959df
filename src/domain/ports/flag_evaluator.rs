//! Flag Evaluator Port
//!
//! Defines the interface for evaluating remote feature flags.

use async_trait::async_trait;

/// Evaluator for boolean feature flags.
///
/// This is an outbound port that abstracts the flag backend.
/// Implementations must not fail: any evaluation problem (backend down,
/// timeout, unknown flag, wrong type) resolves to `default`.
#[async_trait]
pub trait FlagEvaluator: Send + Sync {
    /// Evaluate a boolean flag, returning `default` when it cannot be resolved.
    async fn evaluate_bool(&self, flag_key: &str, default: bool) -> bool;
}
