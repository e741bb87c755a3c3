//! Proactive token refresh scheduling
//!
//! One-shot cancellable alarm that fires shortly before the access token
//! expires. Arming is keyed by an epoch counter: every arm or disarm bumps
//! the epoch, and a fired task re-checks it before invoking the callback,
//! so a stale alarm can never refresh a session that was re-armed or torn
//! down after it was scheduled. At most one alarm is pending at a time.
//!
//! Refresh success re-arms naturally through the session's success path;
//! refresh failure schedules nothing — the failure path already forces
//! logout.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Default lead time before expiry at which the refresh fires.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(300);

/// Delay until the refresh alarm for a token expiring in `expires_in`.
///
/// `expires_in - margin`, saturating at zero for tokens shorter-lived
/// than the margin (refresh immediately).
pub fn refresh_delay(expires_in: Duration, margin: Duration) -> Duration {
    expires_in.saturating_sub(margin)
}

/// Cancellable one-shot refresh alarm.
pub struct RefreshScheduler {
    margin: Duration,
    epoch: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(margin: Duration) -> Self {
        Self {
            margin,
            epoch: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    /// Configured refresh margin.
    pub fn margin(&self) -> Duration {
        self.margin
    }

    /// Arm the alarm for a token expiring in `expires_in`.
    ///
    /// Always cancels any previously armed alarm first; there is at most
    /// one pending alarm at a time.
    pub fn arm<F, Fut>(&self, expires_in: Duration, refresh: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch_slot = self.epoch.clone();
        let delay = refresh_delay(expires_in, self.margin);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A later arm/disarm invalidates this alarm even if the abort
            // raced the wakeup.
            if epoch_slot.load(Ordering::SeqCst) != epoch {
                return;
            }
            debug!("refresh alarm fired");
            refresh().await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
        debug!(delay_secs = delay.as_secs(), "armed refresh alarm");
    }

    /// Cancel the pending alarm, if any.
    pub fn disarm(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.take() {
            previous.abort();
            debug!("disarmed refresh alarm");
        }
    }

    /// Whether an alarm is currently pending.
    pub fn is_armed(&self) -> bool {
        let pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.disarm();
    }
}
