//! OFREP Flag Evaluator
//!
//! Implements FlagEvaluator against the OpenFeature Remote Evaluation
//! Protocol (OFREP) HTTP API, as served by flagd.
//!
//! See: https://github.com/open-feature/protocol

use crate::domain::ports::FlagEvaluator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request body for a single-flag evaluation.
#[derive(Debug, Serialize)]
struct EvaluationRequest {
    context: serde_json::Map<String, serde_json::Value>,
}

/// Successful evaluation response. Only `value` is used.
#[derive(Debug, Deserialize)]
struct EvaluationResponse {
    value: serde_json::Value,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Configuration for the OFREP connection.
#[derive(Debug, Clone)]
pub struct OfrepConfig {
    /// Base URL of the OFREP API (e.g., "http://flagd:8016")
    pub base_url: String,
    /// Upper bound on a single evaluation request
    pub timeout: Duration,
}

impl Default for OfrepConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8016".to_string(),
            timeout: Duration::from_millis(500),
        }
    }
}

/// Remote flag evaluator.
///
/// The HTTP client is built once and reused; every evaluation error
/// (transport, timeout, non-2xx, malformed body, wrong type) resolves to
/// the caller's default.
pub struct OfrepFlagEvaluator {
    config: OfrepConfig,
    client: reqwest::Client,
}

impl OfrepFlagEvaluator {
    pub fn new(config: OfrepConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    fn flag_url(&self, flag_key: &str) -> String {
        format!(
            "{}/ofrep/v1/evaluate/flags/{}",
            self.config.base_url.trim_end_matches('/'),
            flag_key
        )
    }

    /// Fetch the raw flag value.
    async fn fetch_flag(&self, flag_key: &str) -> anyhow::Result<serde_json::Value> {
        let request = EvaluationRequest {
            context: serde_json::Map::new(),
        };

        let response = self
            .client
            .post(self.flag_url(flag_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("flag evaluation failed: {} - {}", status, body);
        }

        let data: EvaluationResponse = response.json().await?;
        tracing::debug!(
            "flag {} evaluated: variant={:?} reason={:?}",
            flag_key,
            data.variant,
            data.reason
        );
        Ok(data.value)
    }
}

#[async_trait]
impl FlagEvaluator for OfrepFlagEvaluator {
    async fn evaluate_bool(&self, flag_key: &str, default: bool) -> bool {
        match self.fetch_flag(flag_key).await {
            Ok(serde_json::Value::Bool(value)) => value,
            Ok(other) => {
                tracing::warn!(
                    "flag {} is not a boolean (got {}), using default {}",
                    flag_key,
                    other,
                    default
                );
                default
            }
            Err(e) => {
                tracing::warn!(
                    "flag {} evaluation error, using default {}: {:#}",
                    flag_key,
                    default,
                    e
                );
                default
            }
        }
    }
}
