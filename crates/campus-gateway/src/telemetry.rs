//! Bounded telemetry buffers for outbound requests
//!
//! Two ring buffers: one for per-request performance records, one for
//! failures. Both are capped; the oldest entries are dropped once a cap
//! is reached. The buffers exist purely for a diagnostics view to
//! consume; nothing in the client branches on their contents.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Default cap for the performance buffer.
pub const DEFAULT_PERFORMANCE_CAPACITY: usize = 100;

/// Default cap for the error buffer.
pub const DEFAULT_ERROR_CAPACITY: usize = 50;

/// Timing record appended for every completed dispatch.
///
/// `status` is `None` when no response was received (transport failure).
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRecord {
    pub url: String,
    pub method: String,
    pub status: Option<u16>,
    pub elapsed_ms: u64,
    pub timestamp_ms: u64,
    pub request_id: String,
}

/// Failure record appended in addition to the performance record.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub url: String,
    pub method: String,
    pub status: Option<u16>,
    pub elapsed_ms: u64,
    pub timestamp_ms: u64,
    pub request_id: String,
    pub message: String,
}

/// Bounded telemetry store shared by all requests of one client.
pub struct Telemetry {
    performance: Mutex<VecDeque<PerformanceRecord>>,
    errors: Mutex<VecDeque<ErrorRecord>>,
    performance_capacity: usize,
    error_capacity: usize,
}

impl Telemetry {
    pub fn new(performance_capacity: usize, error_capacity: usize) -> Self {
        Self {
            performance: Mutex::new(VecDeque::with_capacity(performance_capacity)),
            errors: Mutex::new(VecDeque::with_capacity(error_capacity)),
            performance_capacity,
            error_capacity,
        }
    }

    /// Append a performance record, dropping the oldest past the cap.
    pub fn record_performance(&self, record: PerformanceRecord) {
        let mut buffer = self.performance.lock().unwrap_or_else(|e| e.into_inner());
        push_bounded(&mut buffer, self.performance_capacity, record);
    }

    /// Append an error record, dropping the oldest past the cap.
    pub fn record_error(&self, record: ErrorRecord) {
        let mut buffer = self.errors.lock().unwrap_or_else(|e| e.into_inner());
        push_bounded(&mut buffer, self.error_capacity, record);
    }

    /// Snapshot of the performance buffer, oldest first.
    pub fn performance(&self) -> Vec<PerformanceRecord> {
        let buffer = self.performance.lock().unwrap_or_else(|e| e.into_inner());
        buffer.iter().cloned().collect()
    }

    /// Snapshot of the error buffer, oldest first.
    pub fn errors(&self) -> Vec<ErrorRecord> {
        let buffer = self.errors.lock().unwrap_or_else(|e| e.into_inner());
        buffer.iter().cloned().collect()
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new(DEFAULT_PERFORMANCE_CAPACITY, DEFAULT_ERROR_CAPACITY)
    }
}

fn push_bounded<T>(buffer: &mut VecDeque<T>, capacity: usize, item: T) {
    while buffer.len() >= capacity.max(1) {
        buffer.pop_front();
    }
    buffer.push_back(item);
}

/// Current wall-clock time as unix milliseconds.
pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Duration as whole milliseconds, saturating.
pub(crate) fn as_millis(elapsed: Duration) -> u64 {
    elapsed.as_millis().min(u64::MAX as u128) as u64
}
