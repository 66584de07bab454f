//! Best-effort request/response logging
//!
//! Every API call produces a [`LogRecord`] that is handed to a [`LogSink`] on
//! a spawned task. Writes are bounded by a timeout and their failures are only
//! logged and counted; the request path never waits on or fails because of
//! them.

use crate::metrics::Metrics;
use crate::middleware::RequestId;
use async_trait::async_trait;
use mongodb::bson::DateTime;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub mod mongo;

pub use mongo::MongoLogStore;

/// One logged API exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub endpoint: String,
    pub request_id: String,
    pub request: serde_json::Value,
    pub response: serde_json::Value,
    pub timestamp: DateTime,
}

impl LogRecord {
    /// Create a record stamped with the current time
    pub fn new(
        endpoint: &str,
        request_id: RequestId,
        request: serde_json::Value,
        response: serde_json::Value,
    ) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            request_id: request_id.to_string(),
            request,
            response,
            timestamp: DateTime::now(),
        }
    }
}

/// Errors from writing a log record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    #[error("failed to connect to the log store: {reason}")]
    Connect { reason: String },

    #[error("failed to write log record: {reason}")]
    Write { reason: String },

    #[error("log write timed out after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

/// Destination for log records
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Persist one record
    async fn write(&self, record: LogRecord) -> Result<(), LogError>;

    /// Short name for health output (e.g. "mongodb")
    fn name(&self) -> &'static str;
}

/// Sink used when request logging is disabled or unconfigured
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogSink;

#[async_trait]
impl LogSink for NoopLogSink {
    async fn write(&self, _record: LogRecord) -> Result<(), LogError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Fire-and-forget front end over a [`LogSink`]
#[derive(Clone)]
pub struct RequestLogger {
    sink: Arc<dyn LogSink>,
    metrics: Arc<Metrics>,
    write_timeout: Duration,
}

impl RequestLogger {
    /// Create a logger writing to `sink`
    pub fn new(sink: Arc<dyn LogSink>, metrics: Arc<Metrics>, write_timeout: Duration) -> Self {
        Self {
            sink,
            metrics,
            write_timeout,
        }
    }

    /// Name of the underlying sink
    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Submit a record without waiting for it to be written
    ///
    /// Returns the spawned task's handle; callers normally drop it.
    pub fn record(&self, record: LogRecord) -> tokio::task::JoinHandle<()> {
        let sink = self.sink.clone();
        let metrics = self.metrics.clone();
        let write_timeout = self.write_timeout;

        tokio::spawn(async move {
            let endpoint = record.endpoint.clone();
            let request_id = record.request_id.clone();
            let outcome = match tokio::time::timeout(write_timeout, sink.write(record)).await {
                Ok(result) => result,
                Err(_) => Err(LogError::Timeout {
                    timeout_seconds: write_timeout.as_secs(),
                }),
            };

            if let Err(e) = outcome {
                metrics.request_log_failure();
                tracing::warn!(
                    request_id = %request_id,
                    endpoint = %endpoint,
                    sink = sink.name(),
                    error = %e,
                    "Request log write failed (non-fatal)"
                );
            }
        })
    }
}
