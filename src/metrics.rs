//! Prometheus metrics collection for TripNavi
//!
//! Tracks request outcomes per endpoint, gateway failures by kind, parse
//! failures by kind, gateway latency, and request-log write failures. Exposed
//! at `/metrics` in Prometheus text format.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// API endpoint label
///
/// A closed set keeps label cardinality fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Route,
    TouristSpots,
    Coordinates,
}

impl Endpoint {
    /// Convert endpoint to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Route => "get_route",
            Endpoint::TouristSpots => "get_tourist_spots",
            Endpoint::Coordinates => "coordinates",
        }
    }
}

/// Request outcome label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
}

impl Outcome {
    /// Convert outcome to Prometheus label string
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::ClientError => "client_error",
            Outcome::ServerError => "server_error",
        }
    }
}

/// Metrics collector for TripNavi
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,
    requests_total: IntCounterVec,
    gateway_failures: IntCounterVec,
    parse_failures: IntCounterVec,
    gateway_duration: HistogramVec,
    request_log_failures: IntCounter,
}

impl Metrics {
    /// Create a new Metrics instance
    ///
    /// Registers all metrics with a new Prometheus registry.
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails (e.g., duplicate names).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "tripnavi_requests_total",
                "Total API requests by endpoint and outcome",
            ),
            &["endpoint", "outcome"],
        )?;

        // kind: config, network, upstream_status, malformed_envelope
        let gateway_failures = IntCounterVec::new(
            Opts::new(
                "tripnavi_gateway_failures_total",
                "LLM gateway calls that failed after retries, by failure kind",
            ),
            &["kind"],
        )?;

        // kind: malformed_json, invalid_shape
        let parse_failures = IntCounterVec::new(
            Opts::new(
                "tripnavi_parse_failures_total",
                "LLM itinerary replies that could not be parsed, by failure kind",
            ),
            &["kind"],
        )?;

        let gateway_duration = HistogramVec::new(
            HistogramOpts::new(
                "tripnavi_gateway_duration_ms",
                "LLM gateway call latency in milliseconds, retries included",
            )
            .buckets(vec![
                250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 20000.0, 40000.0, 80000.0,
            ]),
            &["endpoint"],
        )?;

        let request_log_failures = IntCounter::new(
            "tripnavi_request_log_failures_total",
            "Request log writes that failed or timed out",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(gateway_failures.clone()))?;
        registry.register(Box::new(parse_failures.clone()))?;
        registry.register(Box::new(gateway_duration.clone()))?;
        registry.register(Box::new(request_log_failures.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            gateway_failures,
            parse_failures,
            gateway_duration,
            request_log_failures,
        })
    }

    /// Count a finished API request
    pub fn record_request(&self, endpoint: Endpoint, outcome: Outcome) {
        self.requests_total
            .with_label_values(&[endpoint.as_str(), outcome.as_str()])
            .inc();
    }

    /// Count a gateway failure surfaced to a handler
    pub fn gateway_failure(&self, kind: &str) {
        self.gateway_failures.with_label_values(&[kind]).inc();
    }

    /// Count an itinerary parse failure
    pub fn parse_failure(&self, kind: &str) {
        self.parse_failures.with_label_values(&[kind]).inc();
    }

    /// Record gateway latency
    pub fn observe_gateway_duration(&self, endpoint: Endpoint, duration_ms: f64) {
        self.gateway_duration
            .with_label_values(&[endpoint.as_str()])
            .observe(duration_ms);
    }

    /// Count a failed request-log write
    pub fn request_log_failure(&self) {
        self.request_log_failures.inc();
    }

    /// Current request count for an endpoint and outcome
    pub fn requests_count(&self, endpoint: Endpoint, outcome: Outcome) -> u64 {
        self.requests_total
            .with_label_values(&[endpoint.as_str(), outcome.as_str()])
            .get()
    }

    /// Current gateway failure count for a kind
    pub fn gateway_failures_count(&self, kind: &str) -> u64 {
        self.gateway_failures.with_label_values(&[kind]).get()
    }

    /// Current parse failure count for a kind
    pub fn parse_failures_count(&self, kind: &str) -> u64 {
        self.parse_failures.with_label_values(&[kind]).get()
    }

    /// Current request-log failure count
    pub fn request_log_failures_count(&self) -> u64 {
        self.request_log_failures.get()
    }

    /// Encode all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new_registers_everything() {
        let metrics = Metrics::new().expect("should create metrics");
        metrics.record_request(Endpoint::Route, Outcome::Success);
        metrics.gateway_failure("network");
        metrics.parse_failure("malformed_json");
        metrics.observe_gateway_duration(Endpoint::Route, 1200.0);
        metrics.request_log_failure();

        let output = metrics.gather().expect("should gather");
        assert!(output.contains("tripnavi_requests_total"));
        assert!(output.contains("tripnavi_gateway_failures_total"));
        assert!(output.contains("tripnavi_parse_failures_total"));
        assert!(output.contains("tripnavi_gateway_duration_ms"));
        assert!(output.contains("tripnavi_request_log_failures_total"));
    }

    #[test]
    fn test_request_counts_are_labelled() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request(Endpoint::Route, Outcome::ClientError);
        metrics.record_request(Endpoint::Route, Outcome::ClientError);
        metrics.record_request(Endpoint::TouristSpots, Outcome::Success);

        assert_eq!(metrics.requests_count(Endpoint::Route, Outcome::ClientError), 2);
        assert_eq!(metrics.requests_count(Endpoint::Route, Outcome::Success), 0);
        assert_eq!(metrics.requests_count(Endpoint::TouristSpots, Outcome::Success), 1);

        let output = metrics.gather().unwrap();
        assert!(output.contains(r#"endpoint="get_route",outcome="client_error""#));
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new().unwrap();
        let clone = metrics.clone();
        clone.gateway_failure("upstream_status");
        assert_eq!(metrics.gateway_failures_count("upstream_status"), 1);
    }
}
