//! API gateway client for the campus platform
//!
//! Wraps every outbound call to the remote API in one pipeline: correlation
//! id header, bearer credential injection, latency measurement, and
//! bounded telemetry buffers. A TTL response cache with prefix
//! invalidation rides alongside for read endpoints.
//!
//! Request flow:
//! 1. Caller invokes `ApiClient::get`/`post`/`put` with an API path
//! 2. Pipeline attaches `X-Request-ID` and, when set, `Authorization: Bearer`
//! 3. Dispatch is timed; a performance record is appended on completion
//! 4. Failures additionally append an error record and re-raise unchanged
//!
//! The bearer slot is owned by the session layer; this crate only stores
//! and injects it.

pub mod cache;
pub mod client;
pub mod error;
pub mod metrics;
pub mod telemetry;

pub use cache::ResponseCache;
pub use client::{ApiClient, ClientOptions, REQUEST_ID_HEADER};
pub use error::{Error, Result};
pub use telemetry::{ErrorRecord, PerformanceRecord, Telemetry};
