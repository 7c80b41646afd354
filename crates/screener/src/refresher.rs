//! Background token refresh.

use std::sync::Arc;
use std::time::Duration;

use screener_refresh::{RefreshMetrics, RefreshOutcome, RefreshScheduler};
use screener_session::{unix_now, Claims, SessionState, Storage};
use screener_transport::HttpTransport;
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::app::AppSession;

/// How long before `exp` a refresh is forced, whatever the interval.
const EXPIRY_LEAD: Duration = Duration::from_secs(30);

/// Floor between two refreshes, so a token that is already expired or
/// about to expire does not spin the loop.
const MIN_REFRESH_GAP: Duration = Duration::from_secs(5);

/// Handle to a running refresh loop.
pub struct RefreshTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<RefreshMetrics>,
}

impl RefreshTask {
    pub(crate) fn new(shutdown: oneshot::Sender<()>, handle: JoinHandle<RefreshMetrics>) -> Self {
        Self { shutdown, handle }
    }

    /// Stops the loop and returns what it did.
    pub async fn stop(self) -> RefreshMetrics {
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(metrics) => metrics,
            Err(e) => {
                tracing::warn!(error = %e, "refresh task ended abnormally");
                RefreshMetrics::default()
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

pub(crate) async fn run_refresh_loop<S, T>(
    session: Arc<Mutex<AppSession<S, T>>>,
    mut scheduler: RefreshScheduler,
    session_changed: Arc<Notify>,
    mut shutdown: oneshot::Receiver<()>,
) -> RefreshMetrics
where
    S: Storage,
    T: HttpTransport,
{
    tracing::debug!(interval = ?scheduler.interval(), "refresh loop started");
    schedule_before_expiry(&mut scheduler, session.lock().await.user(), unix_now());

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = session_changed.notified() => {
                schedule_before_expiry(&mut scheduler, session.lock().await.user(), unix_now());
            }
            tick = scheduler.wait_for_refresh() => {
                let mut ctx = session.lock().await;
                let outcome = if ctx.state() != SessionState::Authenticated {
                    RefreshOutcome::Skipped
                } else {
                    match ctx.refresh_tokens().await {
                        Ok(()) => RefreshOutcome::Refreshed,
                        Err(e) => {
                            tracing::debug!(attempt = tick.attempt, error = %e, "scheduled refresh failed");
                            RefreshOutcome::Failed
                        }
                    }
                };
                schedule_before_expiry(&mut scheduler, ctx.user(), unix_now());
                drop(ctx);
                scheduler.record_result(outcome);
            }
        }
    }
    tracing::debug!("refresh loop stopped");
    scheduler.metrics().clone()
}

/// Pulls the next tick in to `EXPIRY_LEAD` before the access token's
/// `exp`, never sooner than `MIN_REFRESH_GAP` from now. No-op without a
/// user or without `exp`.
fn schedule_before_expiry(scheduler: &mut RefreshScheduler, user: Option<&Claims>, now: u64) {
    let Some(user) = user.filter(|u| u.exp.is_some()) else {
        return;
    };
    let left = user.expires_in(now).unwrap_or(Duration::ZERO);
    scheduler.refresh_within(left.saturating_sub(EXPIRY_LEAD).max(MIN_REFRESH_GAP));
}
