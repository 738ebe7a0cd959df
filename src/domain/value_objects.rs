//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use serde::{Deserialize, Serialize};

/// Product eligible for flag-gated failure simulation.
pub const SENTINEL_PRODUCT_ID: &str = "OLJCESPC7Z";

/// Flag toggling the simulated failure of the sentinel product.
pub const PRODUCT_FAILURE_FLAG: &str = "productCatalogFailure";

/// Random failure rate, expressed as failures per thousand calls.
///
/// Always within `0..=1000`: 0 never fails, 1000 always fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FailureRate(u16);

impl FailureRate {
    pub const MAX: u16 = 1000;
    pub const DEFAULT: FailureRate = FailureRate(5);

    /// Build a rate, clamping out-of-range values into `0..=1000`.
    pub fn per_thousand(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX as i64) as u16)
    }

    pub fn never() -> Self {
        Self(0)
    }

    pub fn always() -> Self {
        Self(Self::MAX)
    }

    pub fn get(&self) -> u16 {
        self.0
    }

    /// Whether a draw in `0..1000` triggers a failure.
    pub fn triggers(&self, draw: u32) -> bool {
        draw < u32::from(self.0)
    }
}

impl Default for FailureRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for FailureRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What happens when a simulated crash fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrashPolicy {
    /// Panic the request task; the transport lets it unwind uncaught.
    #[default]
    Panic,
    /// Panic the request task; the transport converts it to an internal error.
    Recover,
    /// Abort the whole process.
    Abort,
}

impl CrashPolicy {
    /// Parse a policy name, falling back to `Panic` for unknown values.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "recover" => Self::Recover,
            "abort" => Self::Abort,
            _ => Self::Panic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panic => "panic",
            Self::Recover => "recover",
            Self::Abort => "abort",
        }
    }
}

impl std::fmt::Display for CrashPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of the service as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Catalog not yet loaded
    Uninitialized,
    /// Accepting queries and health checks
    Serving,
    /// Finishing in-flight requests, refusing new ones
    Draining,
    /// Transport closed
    Stopped,
}

impl ServiceState {
    pub(crate) fn to_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Serving => 1,
            Self::Draining => 2,
            Self::Stopped => 3,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Serving,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

impl std::fmt::Display for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Serving => write!(f, "serving"),
            Self::Draining => write!(f, "draining"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Health status reported to health checks.
///
/// The catalog is either up and answering or not reachable at all, so
/// `Serving` is the only status it ever reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServingStatus {
    Serving,
}
