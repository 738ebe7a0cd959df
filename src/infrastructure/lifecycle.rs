//! Service Lifecycle
//!
//! Tracks the `Uninitialized → Serving → Draining → Stopped` state machine,
//! counts in-flight requests and coordinates graceful shutdown.

use crate::domain::value_objects::ServiceState;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::Notify;

/// Lifecycle coordinator for the serving process.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct Lifecycle {
    /// Current `ServiceState`, encoded as u8
    state: Arc<AtomicU8>,
    /// Number of requests currently being handled
    in_flight: Arc<AtomicUsize>,
    /// Broadcast channel fired once when draining starts
    shutdown_tx: broadcast::Sender<()>,
    /// Notify when the last in-flight request finishes during drain
    drain_complete: Arc<Notify>,
}

impl Lifecycle {
    /// Create a lifecycle in the `Uninitialized` state.
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            state: Arc::new(AtomicU8::new(ServiceState::Uninitialized.to_u8())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
            drain_complete: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> ServiceState {
        ServiceState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_serving(&self) -> bool {
        self.state() == ServiceState::Serving
    }

    fn transition(&self, from: ServiceState, to: ServiceState) -> bool {
        self.state
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Catalog loaded and transport bound: start accepting requests.
    ///
    /// Returns false if the service already left `Uninitialized`.
    pub fn mark_serving(&self) -> bool {
        let ok = self.transition(ServiceState::Uninitialized, ServiceState::Serving);
        if ok {
            tracing::info!("service state: serving");
        }
        ok
    }

    /// Stop admitting new requests and let in-flight ones finish.
    ///
    /// Idempotent: only the first call broadcasts the shutdown signal.
    pub fn begin_drain(&self) -> bool {
        let ok = self.transition(ServiceState::Serving, ServiceState::Draining)
            || self.transition(ServiceState::Uninitialized, ServiceState::Draining);
        if ok {
            tracing::info!(
                "service state: draining ({} requests in flight)",
                self.in_flight()
            );
            let _ = self.shutdown_tx.send(());
            if self.in_flight() == 0 {
                self.drain_complete.notify_waiters();
            }
        }
        ok
    }

    /// Transport closed.
    pub fn mark_stopped(&self) {
        let prev = ServiceState::from_u8(
            self.state.swap(ServiceState::Stopped.to_u8(), Ordering::SeqCst),
        );
        if prev != ServiceState::Stopped {
            tracing::info!("service state: stopped");
        }
    }

    /// Subscribe to the drain notification.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Resolves once draining has begun.
    pub async fn draining(&self) {
        let mut rx = self.subscribe();
        if matches!(self.state(), ServiceState::Draining | ServiceState::Stopped) {
            return;
        }
        let _ = rx.recv().await;
    }

    /// Number of requests currently being handled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Admit a request. Returns `None` unless the service is serving.
    ///
    /// The guard decrements the in-flight count when dropped.
    pub fn request_guard(&self) -> Option<RequestGuard> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = RequestGuard {
            lifecycle: self.clone(),
        };
        if self.is_serving() {
            Some(guard)
        } else {
            None
        }
    }

    fn request_finished(&self) {
        let prev = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if prev == 1 && !self.is_serving() {
            self.drain_complete.notify_waiters();
        }
    }

    /// Wait for all in-flight requests to finish (with timeout).
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.drain_complete.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return true;
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = tokio::time::sleep_until(deadline) => {
                    tracing::warn!(
                        "drain timeout: {} requests still in flight",
                        self.in_flight()
                    );
                    return false;
                }
            }
        }
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard for an admitted request.
pub struct RequestGuard {
    lifecycle: Lifecycle,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.lifecycle.request_finished();
    }
}

/// Wait for Ctrl+C or SIGTERM, then begin draining.
#[cfg_attr(coverage_nightly, coverage(off))]
pub async fn shutdown_signal(lifecycle: Lifecycle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, initiating shutdown");
        }
    }

    lifecycle.begin_drain();
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn serving() -> Lifecycle {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.mark_serving());
        lifecycle
    }

    #[test]
    fn test_lifecycle_new() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), ServiceState::Uninitialized);
        assert_eq!(lifecycle.in_flight(), 0);
        assert!(!lifecycle.is_serving());
    }

    #[test]
    fn test_state_machine_happy_path() {
        let lifecycle = Lifecycle::default();

        assert!(lifecycle.mark_serving());
        assert_eq!(lifecycle.state(), ServiceState::Serving);

        assert!(lifecycle.begin_drain());
        assert_eq!(lifecycle.state(), ServiceState::Draining);

        lifecycle.mark_stopped();
        assert_eq!(lifecycle.state(), ServiceState::Stopped);
    }

    #[test]
    fn test_mark_serving_only_once() {
        let lifecycle = serving();
        assert!(!lifecycle.mark_serving());

        lifecycle.begin_drain();
        assert!(!lifecycle.mark_serving());
        assert_eq!(lifecycle.state(), ServiceState::Draining);
    }

    #[test]
    fn test_begin_drain_idempotent() {
        let lifecycle = serving();
        assert!(lifecycle.begin_drain());
        assert!(!lifecycle.begin_drain());
        assert_eq!(lifecycle.state(), ServiceState::Draining);
    }

    #[test]
    fn test_stopped_cannot_drain_or_serve() {
        let lifecycle = serving();
        lifecycle.mark_stopped();
        assert!(!lifecycle.begin_drain());
        assert!(!lifecycle.mark_serving());
        assert_eq!(lifecycle.state(), ServiceState::Stopped);
    }

    #[test]
    fn test_request_guard_rejected_before_serving() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.request_guard().is_none());
        assert_eq!(lifecycle.in_flight(), 0);
    }

    #[test]
    fn test_request_guard_rejected_while_draining() {
        let lifecycle = serving();
        lifecycle.begin_drain();
        assert!(lifecycle.request_guard().is_none());
        assert_eq!(lifecycle.in_flight(), 0);
    }

    #[test]
    fn test_request_guard_tracking() {
        let lifecycle = serving();

        let guard1 = lifecycle.request_guard().unwrap();
        let guard2 = lifecycle.request_guard().unwrap();
        assert_eq!(lifecycle.in_flight(), 2);

        drop(guard1);
        assert_eq!(lifecycle.in_flight(), 1);

        drop(guard2);
        assert_eq!(lifecycle.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_receives_drain() {
        let lifecycle = serving();
        let mut rx = lifecycle.subscribe();

        lifecycle.begin_drain();

        let result = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_draining_resolves_after_begin_drain() {
        let lifecycle = serving();
        let waiter = lifecycle.clone();
        let handle = tokio::spawn(async move { waiter.draining().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        lifecycle.begin_drain();

        let result = tokio::time::timeout(Duration::from_millis(200), handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_draining_resolves_immediately_when_already_draining() {
        let lifecycle = serving();
        lifecycle.begin_drain();

        let result = tokio::time::timeout(Duration::from_millis(100), lifecycle.draining()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wait_for_drain_immediate() {
        let lifecycle = serving();
        lifecycle.begin_drain();

        let drained = lifecycle.wait_for_drain(Duration::from_millis(100)).await;
        assert!(drained);
    }

    #[tokio::test]
    async fn test_wait_for_drain_with_requests() {
        let lifecycle = serving();
        let guard = lifecycle.request_guard().unwrap();
        lifecycle.begin_drain();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        let drained = lifecycle.wait_for_drain(Duration::from_millis(500)).await;
        assert!(drained);
        assert_eq!(lifecycle.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_drain_timeout() {
        let lifecycle = serving();
        let _guard = lifecycle.request_guard().unwrap();
        lifecycle.begin_drain();

        let drained = lifecycle.wait_for_drain(Duration::from_millis(50)).await;
        assert!(!drained);
    }

    #[test]
    fn test_clone_shares_state() {
        let lifecycle = Lifecycle::new();
        let cloned = lifecycle.clone();

        cloned.mark_serving();
        assert!(lifecycle.is_serving());

        let _guard = lifecycle.request_guard().unwrap();
        assert_eq!(cloned.in_flight(), 1);
    }
}
