use crate::domain::value_objects::{CrashPolicy, FailureRate};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const PORT_VAR: &str = "PRODUCT_CATALOG_SERVICE_PORT";
pub const FAILURE_RATE_VAR: &str = "PRODUCT_CATALOG_FAILS_PER_THOUSAND_CALLS";
pub const PRODUCTS_DIR_VAR: &str = "PRODUCT_CATALOG_PRODUCTS_DIR";
pub const CRASH_POLICY_VAR: &str = "PRODUCT_CATALOG_CRASH_POLICY";
pub const OFREP_URL_VAR: &str = "FLAGD_OFREP_URL";
pub const FLAGD_HOST_VAR: &str = "FLAGD_HOST";
pub const FLAGD_OFREP_PORT_VAR: &str = "FLAGD_OFREP_PORT";
pub const FLAG_TIMEOUT_VAR: &str = "FLAG_EVALUATION_TIMEOUT_MS";

const DEFAULT_PRODUCTS_DIR: &str = "./products";
const DEFAULT_OFREP_PORT: u16 = 8016;
const DEFAULT_FLAG_TIMEOUT_MS: u64 = 500;

/// Errors that prevent the service from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PRODUCT_CATALOG_SERVICE_PORT environment variable not set")]
    MissingPort,

    #[error("invalid PRODUCT_CATALOG_SERVICE_PORT value: {0}")]
    InvalidPort(String),
}

/// Log output settings. Read before anything else so the rest of
/// configuration loading can log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub debug: bool,
    pub json: bool,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            debug: lookup("DEBUG").is_some(),
            json: lookup("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Transport
    pub port: u16,

    // Catalog
    pub products_dir: PathBuf,

    // Fault injection
    pub failure_rate: FailureRate,
    pub crash_policy: CrashPolicy,

    // Flag evaluation
    pub ofrep_url: Option<String>,
    pub flag_timeout: Duration,

    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3550,
            products_dir: PathBuf::from(DEFAULT_PRODUCTS_DIR),
            failure_rate: FailureRate::default(),
            crash_policy: CrashPolicy::default(),
            ofrep_url: None,
            flag_timeout: Duration::from_millis(DEFAULT_FLAG_TIMEOUT_MS),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Address the RPC server binds to.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Build the configuration from a variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup(PORT_VAR) {
            Some(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(v.clone()))?,
            _ => return Err(ConfigError::MissingPort),
        };

        let products_dir = lookup(PRODUCTS_DIR_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PRODUCTS_DIR));

        let failure_rate = parse_failure_rate(lookup(FAILURE_RATE_VAR));

        let crash_policy = lookup(CRASH_POLICY_VAR)
            .map(|v| CrashPolicy::from_str(&v))
            .unwrap_or_default();

        let ofrep_url = match lookup(OFREP_URL_VAR).filter(|v| !v.is_empty()) {
            Some(url) => Some(url),
            None => lookup(FLAGD_HOST_VAR).filter(|v| !v.is_empty()).map(|host| {
                let port = lookup(FLAGD_OFREP_PORT_VAR)
                    .and_then(|v| v.trim().parse::<u16>().ok())
                    .unwrap_or(DEFAULT_OFREP_PORT);
                format!("http://{}:{}", host, port)
            }),
        };

        let flag_timeout_ms = lookup(FLAG_TIMEOUT_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_FLAG_TIMEOUT_MS);

        Ok(Self {
            port,
            products_dir,
            failure_rate,
            crash_policy,
            ofrep_url,
            flag_timeout: Duration::from_millis(flag_timeout_ms),
            log: LogConfig::from_lookup(&lookup),
        })
    }
}

/// Parse the random failure rate.
///
/// Unset keeps the default silently; a non-numeric value keeps the default
/// with a warning; an out-of-range value is clamped to `[0, 1000]`.
fn parse_failure_rate(raw: Option<String>) -> FailureRate {
    let Some(raw) = raw else {
        return FailureRate::default();
    };
    match raw.trim().parse::<i64>() {
        Ok(value) => {
            let rate = FailureRate::per_thousand(value);
            if i64::from(rate.get()) != value {
                tracing::warn!(
                    "{}={} is out of range, clamped to {}",
                    FAILURE_RATE_VAR,
                    value,
                    rate
                );
            }
            rate
        }
        Err(e) => {
            tracing::warn!(
                "{}={:?} is not a number ({}), using default {}",
                FAILURE_RATE_VAR,
                raw,
                e,
                FailureRate::default()
            );
            FailureRate::default()
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    Ok(Config::from_lookup(|key| std::env::var(key).ok())?)
}
