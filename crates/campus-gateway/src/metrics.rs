//! Metrics recording for the request pipeline
//!
//! Records to the `metrics` facade:
//!
//! - `api_requests_total` (counter): labels `status`, `method`
//! - `api_request_duration_seconds` (histogram): label `status`
//! - `api_errors_total` (counter): label `kind`
//!
//! The binary installs the Prometheus recorder; without one these calls
//! are no-ops, so library consumers pay nothing.

/// Record a completed dispatch with status and method labels.
///
/// `status` is `None` for transport failures, recorded as `"none"`.
pub fn record_request(method: &str, status: Option<u16>, duration_secs: f64) {
    let status_label = match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    };
    metrics::counter!(
        "api_requests_total",
        "status" => status_label.clone(),
        "method" => method.to_string()
    )
    .increment(1);
    metrics::histogram!("api_request_duration_seconds", "status" => status_label)
        .record(duration_secs);
}

/// Record a failed dispatch with its classification label.
pub fn record_error(kind: &'static str) {
    metrics::counter!("api_errors_total", "kind" => kind).increment(1);
}
