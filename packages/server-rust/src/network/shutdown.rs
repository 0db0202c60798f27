//! Server lifecycle state and in-flight request accounting.
//!
//! The health state lives in an `ArcSwap` so probes read it without locking.
//! In-flight requests are counted by RAII guards taken in middleware.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::{info, warn};

/// Lifecycle of a server process: Starting -> Ready -> Draining -> Stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Listener not yet serving.
    Starting,
    /// Serving bootcamp requests.
    Ready,
    /// Shutdown requested; finishing in-flight requests.
    Draining,
    /// Every in-flight request has finished.
    Stopped,
}

impl HealthState {
    /// Lowercase label reported by the health endpoint.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Shared handle coordinating readiness and drain.
#[derive(Debug)]
pub struct ShutdownController {
    in_flight: Arc<AtomicU64>,
    state: ArcSwap<HealthState>,
}

impl ShutdownController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(AtomicU64::new(0)),
            state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    fn transition(&self, next: HealthState) {
        let previous = *self.state.swap(Arc::new(next));
        if previous != next {
            info!(from = previous.as_str(), to = next.as_str(), "health state changed");
        }
    }

    pub fn set_ready(&self) {
        self.transition(HealthState::Ready);
    }

    /// Moves to `Draining`; readiness probes fail from here on.
    pub fn trigger_shutdown(&self) {
        self.transition(HealthState::Draining);
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.state.load()
    }

    /// Counts one in-flight request until the guard is dropped.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Moves to `Draining`, then waits up to `timeout` for in-flight requests.
    ///
    /// Returns `true` and moves to `Stopped` once the count reaches zero.
    /// On timeout the state stays `Draining` and `false` is returned.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.trigger_shutdown();
        let deadline = tokio::time::Instant::now() + timeout;

        while self.in_flight_count() > 0 {
            if tokio::time::Instant::now() >= deadline {
                warn!(
                    in_flight = self.in_flight_count(),
                    "drain timeout expired with requests still in flight"
                );
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        self.transition(HealthState::Stopped);
        true
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
