//! Fault Injector
//!
//! Per-request decisions for simulated failures: a random crash at a
//! configured rate, and a flag-gated error for one sentinel product.

use crate::domain::ports::{FaultDraw, FlagEvaluator};
use crate::domain::value_objects::{
    CrashPolicy, FailureRate, PRODUCT_FAILURE_FLAG, SENTINEL_PRODUCT_ID,
};
use std::sync::Arc;

/// Failure settings fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureConfig {
    /// Random crash rate per thousand `GetProduct` calls
    pub random_failure_rate: FailureRate,
    /// The only product subject to flag-gated failure
    pub sentinel_product_id: String,
    /// Flag consulted for the sentinel product
    pub flag_key: String,
    /// How a simulated crash terminates
    pub crash_policy: CrashPolicy,
}

impl Default for FailureConfig {
    fn default() -> Self {
        Self {
            random_failure_rate: FailureRate::default(),
            sentinel_product_id: SENTINEL_PRODUCT_ID.to_string(),
            flag_key: PRODUCT_FAILURE_FLAG.to_string(),
            crash_policy: CrashPolicy::default(),
        }
    }
}

impl FailureConfig {
    /// Create a configuration with the given random failure rate.
    pub fn new(random_failure_rate: FailureRate) -> Self {
        Self {
            random_failure_rate,
            ..Default::default()
        }
    }

    /// Set the crash policy.
    pub fn crash_policy(mut self, policy: CrashPolicy) -> Self {
        self.crash_policy = policy;
        self
    }

    /// Set the sentinel product id.
    pub fn sentinel_product_id(mut self, id: impl Into<String>) -> Self {
        self.sentinel_product_id = id.into();
        self
    }
}

/// A triggered random failure.
///
/// Deliberately not an error value: the only way to consume it is
/// [`SimulatedCrash::raise`], which never returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a simulated crash must be raised"]
pub struct SimulatedCrash {
    /// Configured rate at the time of the draw
    pub rate: FailureRate,
    /// The draw that fell under the rate
    pub draw: u32,
}

impl SimulatedCrash {
    /// Terminate abnormally according to `policy`.
    pub fn raise(self, policy: CrashPolicy) -> ! {
        tracing::error!(
            crash_policy = %policy,
            draw = self.draw,
            "Error: {}",
            self
        );
        match policy {
            CrashPolicy::Abort => std::process::abort(),
            CrashPolicy::Panic | CrashPolicy::Recover => panic!("{}", self),
        }
    }
}

impl std::fmt::Display for SimulatedCrash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Random fail to simulate container error. Fail rate is {} per thousand calls",
            self.rate
        )
    }
}

/// Decides whether a request should fail on purpose.
///
/// Owns no mutable state: it reads the startup configuration and calls
/// the injected draw and flag collaborators.
pub struct FaultInjector {
    config: FailureConfig,
    draw: Arc<dyn FaultDraw>,
    flags: Arc<dyn FlagEvaluator>,
}

impl FaultInjector {
    pub fn new(
        config: FailureConfig,
        draw: Arc<dyn FaultDraw>,
        flags: Arc<dyn FlagEvaluator>,
    ) -> Self {
        Self {
            config,
            draw,
            flags,
        }
    }

    pub fn config(&self) -> &FailureConfig {
        &self.config
    }

    /// Random failure check. Returns the crash to raise, if any.
    pub fn check_random(&self) -> Option<SimulatedCrash> {
        let rate = self.config.random_failure_rate;
        if rate == FailureRate::never() {
            return None;
        }
        let draw = self.draw.draw();
        rate.triggers(draw).then_some(SimulatedCrash { rate, draw })
    }

    /// Flag-gated check. Only the sentinel product ever consults the flag.
    pub async fn check_flag(&self, product_id: &str) -> bool {
        if product_id != self.config.sentinel_product_id {
            return false;
        }
        self.flags.evaluate_bool(&self.config.flag_key, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ===== Mock Implementations =====

    struct FixedDraw(u32);

    impl FaultDraw for FixedDraw {
        fn draw(&self) -> u32 {
            self.0
        }
    }

    struct CountingFlags {
        value: bool,
        calls: AtomicUsize,
    }

    impl CountingFlags {
        fn new(value: bool) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FlagEvaluator for CountingFlags {
        async fn evaluate_bool(&self, flag_key: &str, _default: bool) -> bool {
            assert_eq!(flag_key, PRODUCT_FAILURE_FLAG);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.value
        }
    }

    fn injector(rate: i64, draw: u32, flags: Arc<CountingFlags>) -> FaultInjector {
        FaultInjector::new(
            FailureConfig::new(FailureRate::per_thousand(rate)),
            Arc::new(FixedDraw(draw)),
            flags,
        )
    }

    // ===== FailureConfig Tests =====

    #[test]
    fn test_default_config() {
        let config = FailureConfig::default();
        assert_eq!(config.random_failure_rate.get(), 5);
        assert_eq!(config.sentinel_product_id, "OLJCESPC7Z");
        assert_eq!(config.flag_key, "productCatalogFailure");
        assert_eq!(config.crash_policy, CrashPolicy::Panic);
    }

    #[test]
    fn test_builder_pattern() {
        let config = FailureConfig::new(FailureRate::never())
            .crash_policy(CrashPolicy::Recover)
            .sentinel_product_id("A");
        assert_eq!(config.random_failure_rate, FailureRate::never());
        assert_eq!(config.crash_policy, CrashPolicy::Recover);
        assert_eq!(config.sentinel_product_id, "A");
    }

    // ===== check_random Tests =====

    #[test]
    fn test_check_random_rate_zero_never_fires() {
        let flags = Arc::new(CountingFlags::new(false));
        let injector = injector(0, 0, flags);
        assert!(injector.check_random().is_none());
    }

    #[test]
    fn test_check_random_rate_max_always_fires() {
        let flags = Arc::new(CountingFlags::new(false));
        let injector = injector(1000, 999, flags);
        let crash = injector.check_random().unwrap();
        assert_eq!(crash.draw, 999);
        assert_eq!(crash.rate.get(), 1000);
    }

    #[test]
    fn test_check_random_below_rate_fires() {
        let flags = Arc::new(CountingFlags::new(false));
        assert!(injector(5, 4, flags.clone()).check_random().is_some());
        assert!(injector(5, 5, flags).check_random().is_none());
    }

    #[test]
    fn test_simulated_crash_message() {
        let crash = SimulatedCrash {
            rate: FailureRate::per_thousand(5),
            draw: 1,
        };
        assert_eq!(
            crash.to_string(),
            "Random fail to simulate container error. Fail rate is 5 per thousand calls"
        );
    }

    #[test]
    fn test_raise_panics_under_panic_policy() {
        let crash = SimulatedCrash {
            rate: FailureRate::always(),
            draw: 0,
        };
        let result = std::panic::catch_unwind(|| {
            crash.raise(CrashPolicy::Panic);
        });
        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.contains("Random fail to simulate container error"));
    }

    #[test]
    fn test_raise_panics_under_recover_policy() {
        let crash = SimulatedCrash {
            rate: FailureRate::always(),
            draw: 0,
        };
        let result = std::panic::catch_unwind(|| {
            crash.raise(CrashPolicy::Recover);
        });
        assert!(result.is_err());
    }

    const ABORT_CHILD_VAR: &str = "PRODUCT_CATALOG_ABORT_CHILD";

    /// Re-runs itself in a child process, which aborts; the parent checks
    /// the child died abnormally instead of unwinding.
    #[test]
    fn test_raise_aborts_process_under_abort_policy() {
        if std::env::var_os(ABORT_CHILD_VAR).is_some() {
            let crash = SimulatedCrash {
                rate: FailureRate::always(),
                draw: 0,
            };
            crash.raise(CrashPolicy::Abort);
        }

        let status = std::process::Command::new(std::env::current_exe().unwrap())
            .args([
                "--exact",
                "domain::services::fault_injector::tests::test_raise_aborts_process_under_abort_policy",
                "--nocapture",
            ])
            .env(ABORT_CHILD_VAR, "1")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .unwrap();

        assert!(!status.success());
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            // SIGABRT
            assert_eq!(status.signal(), Some(6));
        }
    }

    // ===== check_flag Tests =====

    #[tokio::test]
    async fn test_check_flag_sentinel_enabled() {
        let flags = Arc::new(CountingFlags::new(true));
        let injector = injector(0, 0, flags.clone());
        assert!(injector.check_flag(SENTINEL_PRODUCT_ID).await);
        assert_eq!(flags.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_check_flag_sentinel_disabled() {
        let flags = Arc::new(CountingFlags::new(false));
        let injector = injector(0, 0, flags);
        assert!(!injector.check_flag(SENTINEL_PRODUCT_ID).await);
    }

    #[tokio::test]
    async fn test_check_flag_other_product_skips_evaluation() {
        let flags = Arc::new(CountingFlags::new(true));
        let injector = injector(0, 0, flags.clone());
        assert!(!injector.check_flag("66VCHSJNUP").await);
        assert_eq!(flags.calls.load(Ordering::SeqCst), 0);
    }
}
