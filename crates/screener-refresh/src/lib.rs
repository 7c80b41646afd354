//! Periodic access-token refresh timer.
//!
//! Access tokens are short-lived. With refresh enabled, the client trades
//! its refresh token for a new access token on a fixed interval so a
//! long-running session never presents a stale bearer.
//!
//! # Disabled mode
//!
//! When `interval_secs` is 0 (the default), the scheduler is disabled and
//! [`RefreshScheduler::wait_for_refresh`] pends forever. Callers can keep
//! it in a `tokio::select!` unconditionally.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         _ = shutdown.changed() => break,
//!         tick = scheduler.wait_for_refresh() => {
//!             let outcome = match session.lock().await.refresh_tokens().await {
//!                 Ok(()) => RefreshOutcome::Refreshed,
//!                 Err(_) => RefreshOutcome::Failed,
//!             };
//!             scheduler.record_result(outcome);
//!         }
//!     }
//! }
//! ```

use std::time::Duration;

use rand::Rng;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the refresh timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Seconds between refreshes. 0 = disabled (timer never fires).
    pub interval_secs: u64,

    /// Random jitter (0..max ms) added to the *first* refresh so several
    /// clients started together don't hit the token endpoint in lockstep.
    pub initial_jitter_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 0,
            initial_jitter_ms: 1_000,
        }
    }
}

impl RefreshConfig {
    /// Shortest allowed interval when enabled.
    pub const MIN_INTERVAL_SECS: u64 = 30;

    /// Longest allowed interval (one day).
    pub const MAX_INTERVAL_SECS: u64 = 86_400;

    /// A sensible enabled interval: four minutes, inside the usual
    /// five-minute access-token lifetime.
    pub const RECOMMENDED_INTERVAL_SECS: u64 = 240;

    /// Refresh every `interval_secs` seconds, default jitter.
    pub fn every(interval_secs: u64) -> Self {
        Self {
            interval_secs,
            ..Default::default()
        }
    }

    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called automatically by [`RefreshScheduler::new`]. Rules:
    /// - `interval_secs` of 0 stays 0 (disabled).
    /// - Otherwise clamped to `MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS`.
    /// - `initial_jitter_ms` capped to the interval.
    pub fn validated(mut self) -> Self {
        if self.interval_secs == 0 {
            return self;
        }
        let clamped = self
            .interval_secs
            .clamp(Self::MIN_INTERVAL_SECS, Self::MAX_INTERVAL_SECS);
        if clamped != self.interval_secs {
            warn!(
                interval_secs = self.interval_secs,
                clamped, "refresh interval out of range, clamping"
            );
            self.interval_secs = clamped;
        }
        self.initial_jitter_ms = self.initial_jitter_ms.min(self.interval_secs * 1_000);
        self
    }

    /// Time between refreshes, or `None` when disabled.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }

    pub fn is_enabled(&self) -> bool {
        self.interval_secs > 0
    }
}

// ---------------------------------------------------------------------------
// Tick + outcome
// ---------------------------------------------------------------------------

/// Returned by [`RefreshScheduler::wait_for_refresh`] when a refresh is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTick {
    /// Monotonically increasing attempt number (starts at 1).
    pub attempt: u64,
    /// How late the timer woke up relative to its deadline.
    pub late_by: Duration,
}

/// What the caller did with a [`RefreshTick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New tokens were obtained.
    Refreshed,
    /// The refresh was attempted and failed.
    Failed,
    /// Nothing to refresh (nobody logged in).
    Skipped,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshMetrics {
    pub total_attempts: u64,
    pub total_refreshed: u64,
    pub total_failed: u64,
    pub total_skipped: u64,
    /// Failures since the last success. Reset by a success.
    pub consecutive_failures: u64,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fires once per refresh interval.
pub struct RefreshScheduler {
    config: RefreshConfig,
    interval: Option<Duration>,
    attempts: u64,
    next_refresh: Option<Instant>,
    metrics: RefreshMetrics,
}

impl RefreshScheduler {
    /// Create a scheduler from config. The first refresh is due one
    /// interval (plus jitter) from now.
    pub fn new(config: RefreshConfig) -> Self {
        let config = config.validated();
        let interval = config.interval();

        let next_refresh = interval.map(|d| {
            let jitter = if config.initial_jitter_ms > 0 {
                Duration::from_millis(rand::rng().random_range(0..config.initial_jitter_ms))
            } else {
                Duration::ZERO
            };
            Instant::now() + d + jitter
        });

        match interval {
            Some(d) => debug!(interval_secs = d.as_secs(), "refresh scheduler created"),
            None => debug!("refresh scheduler created disabled"),
        }

        Self {
            config,
            interval,
            attempts: 0,
            next_refresh,
            metrics: RefreshMetrics::default(),
        }
    }

    /// Create a scheduler refreshing every `interval_secs` seconds.
    pub fn every(interval_secs: u64) -> Self {
        Self::new(RefreshConfig::every(interval_secs))
    }

    /// A scheduler that never fires.
    pub fn disabled() -> Self {
        Self::new(RefreshConfig::default())
    }

    /// Wait until the next refresh is due.
    ///
    /// Disabled: pends forever.
    pub async fn wait_for_refresh(&mut self) -> RefreshTick {
        let (next, interval) = match (self.next_refresh, self.interval) {
            (Some(next), Some(interval)) => (next, interval),
            _ => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(next);
        self.attempts += 1;
        // Always from now: a late wake-up never causes a burst.
        self.next_refresh = Some(now + interval);

        trace!(attempt = self.attempts, "refresh due");

        RefreshTick {
            attempt: self.attempts,
            late_by,
        }
    }

    /// Record what happened with the last tick.
    pub fn record_result(&mut self, outcome: RefreshOutcome) {
        self.metrics.total_attempts += 1;
        match outcome {
            RefreshOutcome::Refreshed => {
                self.metrics.total_refreshed += 1;
                self.metrics.consecutive_failures = 0;
            }
            RefreshOutcome::Failed => {
                self.metrics.total_failed += 1;
                self.metrics.consecutive_failures += 1;
                warn!(
                    attempt = self.attempts,
                    consecutive = self.metrics.consecutive_failures,
                    "token refresh failed"
                );
            }
            RefreshOutcome::Skipped => {
                self.metrics.total_skipped += 1;
            }
        }
    }

    /// Bring the next refresh forward to fire within `delay` from now.
    ///
    /// Use when the access token expires sooner than the regular
    /// interval. Never pushes a deadline later. No effect when disabled.
    pub fn refresh_within(&mut self, delay: Duration) {
        let (Some(next), Some(_)) = (self.next_refresh, self.interval) else {
            return;
        };
        let candidate = Instant::now() + delay;
        if candidate < next {
            debug!(delay_ms = delay.as_millis() as u64, "refresh brought forward");
            self.next_refresh = Some(candidate);
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.interval.is_none()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    pub fn metrics(&self) -> &RefreshMetrics {
        &self.metrics
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn config(&self) -> &RefreshConfig {
        &self.config
    }
}
