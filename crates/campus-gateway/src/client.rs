//! Outbound request pipeline
//!
//! Every call dispatched through `ApiClient` gets a generated correlation
//! id (`X-Request-ID`), the bearer credential when one is set, latency
//! measurement, and telemetry recording. The pipeline observes failures
//! and re-raises them unchanged; converting an error into user-visible
//! state is the session layer's job.
//!
//! The correlation id is not used for retries; it exists to cross-reference
//! client-side telemetry with server-side logs.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{DEFAULT_TTL, ResponseCache};
use crate::error::{Error, Result};
use crate::metrics;
use crate::telemetry::{
    DEFAULT_ERROR_CAPACITY, DEFAULT_PERFORMANCE_CAPACITY, ErrorRecord, PerformanceRecord,
    Telemetry, as_millis, unix_millis,
};

/// Correlation id header attached to every outbound request.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Tunables for a gateway client instance.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub performance_capacity: usize,
    pub error_capacity: usize,
    pub default_cache_ttl: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            performance_capacity: DEFAULT_PERFORMANCE_CAPACITY,
            error_capacity: DEFAULT_ERROR_CAPACITY,
            default_cache_ttl: DEFAULT_TTL,
        }
    }
}

/// API gateway client: one per logged-in client instance.
///
/// The bearer slot is the only process-wide mutable credential besides the
/// durable store; both are written exclusively by session transition
/// handlers.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    bearer: RwLock<Option<String>>,
    telemetry: Telemetry,
    cache: ResponseCache,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, options: ClientOptions) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout: options.timeout,
            bearer: RwLock::new(None),
            telemetry: Telemetry::new(options.performance_capacity, options.error_capacity),
            cache: ResponseCache::new(options.default_cache_ttl),
        }
    }

    /// Set the injected bearer credential for subsequent requests.
    pub fn set_bearer(&self, token: impl Into<String>) {
        let mut slot = self.bearer.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token.into());
    }

    /// Clear the injected bearer credential.
    pub fn clear_bearer(&self) {
        let mut slot = self.bearer.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Current bearer credential, if any.
    pub fn bearer(&self) -> Option<String> {
        let slot = self.bearer.read().unwrap_or_else(|e| e.into_inner());
        slot.clone()
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.execute(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)
            .map_err(|e| Error::Decode(format!("serializing request body: {e}")))?;
        self.execute(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_value(body)
            .map_err(|e| Error::Decode(format!("serializing request body: {e}")))?;
        self.execute(Method::PUT, path, Some(body)).await
    }

    /// Read-through cache helper: serve `key` from the response cache when
    /// fresh, otherwise fetch `path` and store the result under `key`.
    pub async fn get_cached(&self, key: &str, path: &str, ttl: Option<Duration>) -> Result<Value> {
        if let Some(hit) = self.cache.get(key) {
            debug!(key, "response cache hit");
            return Ok(hit);
        }
        let value = self.get(path).await?;
        self.cache.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Evict every cached response whose key starts with `prefix`.
    ///
    /// Callers invoke this after a mutation that could have staled cached
    /// reads; the cache never learns of writes on its own.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.cache.clear_by_prefix(prefix)
    }

    /// The response cache, for callers managing their own keys.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The telemetry buffers, for a diagnostics view.
    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let method_label = method.to_string();
        let request_id = new_request_id();

        let mut request = self
            .http
            .request(method, &url)
            .header(REQUEST_ID_HEADER, &request_id)
            .timeout(self.timeout);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        debug!(%url, method = %method_label, request_id, "dispatching request");
        let start = Instant::now();

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = format!("request failed: {e}");
                self.observe_failure(
                    &url,
                    &method_label,
                    None,
                    start.elapsed(),
                    &request_id,
                    &message,
                    "network",
                );
                return Err(Error::Network(message));
            }
        };

        let status = response.status().as_u16();
        let elapsed = start.elapsed();

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let message = format!("reading response body: {e}");
                self.observe_failure(
                    &url,
                    &method_label,
                    Some(status),
                    elapsed,
                    &request_id,
                    &message,
                    "network",
                );
                return Err(Error::Network(message));
            }
        };

        if !(200..300).contains(&status) {
            let err = Error::from_status(status, extract_detail(&text));
            warn!(%url, status, request_id, error = %err, "request failed");
            self.observe_failure(
                &url,
                &method_label,
                Some(status),
                elapsed,
                &request_id,
                &err.user_message(),
                err.kind(),
            );
            return Err(err);
        }

        self.telemetry.record_performance(PerformanceRecord {
            url: url.clone(),
            method: method_label.clone(),
            status: Some(status),
            elapsed_ms: as_millis(elapsed),
            timestamp_ms: unix_millis(),
            request_id,
        });
        metrics::record_request(&method_label, Some(status), elapsed.as_secs_f64());

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| Error::Decode(format!("parsing response body: {e}")))
    }

    /// Append both telemetry records for a failed dispatch and record the
    /// failure metrics.
    #[allow(clippy::too_many_arguments)]
    fn observe_failure(
        &self,
        url: &str,
        method: &str,
        status: Option<u16>,
        elapsed: Duration,
        request_id: &str,
        message: &str,
        kind: &'static str,
    ) {
        let elapsed_ms = as_millis(elapsed);
        let timestamp_ms = unix_millis();
        self.telemetry.record_performance(PerformanceRecord {
            url: url.to_owned(),
            method: method.to_owned(),
            status,
            elapsed_ms,
            timestamp_ms,
            request_id: request_id.to_owned(),
        });
        self.telemetry.record_error(ErrorRecord {
            url: url.to_owned(),
            method: method.to_owned(),
            status,
            elapsed_ms,
            timestamp_ms,
            request_id: request_id.to_owned(),
            message: message.to_owned(),
        });
        metrics::record_request(method, status, elapsed.as_secs_f64());
        metrics::record_error(kind);
    }
}

/// Generate an opaque correlation id.
fn new_request_id() -> String {
    format!("req_{}", uuid::Uuid::new_v4().as_simple())
}

/// Extract the server-supplied `detail` message from an error body.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("detail")?.as_str().map(str::to_owned)
}
