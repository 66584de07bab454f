//! HTTP request handlers for the TripNavi API

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::geocoding::NominatimGeocoder;
use crate::llm::{ChatGateway, GatewayError, OpenAiGateway, RetryPolicy, complete_with_retry};
use crate::metrics::{Endpoint, Metrics, Outcome};
use crate::middleware::{RequestId, request_id_middleware};
use crate::request_log::{LogSink, MongoLogStore, NoopLogSink, RequestLogger};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::trace::TraceLayer;

pub mod coordinates;
pub mod extractor;
pub mod health;
pub mod metrics;
pub mod route;
pub mod spots;

/// Application state shared across all handlers
///
/// All fields are Arc'd (or cheap to copy) for cloning across Axum handlers.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    gateway: Arc<dyn ChatGateway>,
    geocoder: Arc<NominatimGeocoder>,
    request_log: RequestLogger,
    metrics: Arc<Metrics>,
    retry: RetryPolicy,
}

impl AppState {
    /// Create the production state from configuration
    ///
    /// Reads the LLM credential and the document-store URI from the
    /// environment variables named in the configuration.
    pub fn new(config: Arc<Config>) -> AppResult<Self> {
        let api_key = config.llm.read_api_key();
        if api_key.is_none() {
            tracing::warn!(
                env_var = %config.llm.api_key_env(),
                "LLM API credential is not set; route and tourist-spot requests will fail"
            );
        }
        let gateway = Arc::new(OpenAiGateway::new(&config.llm, api_key)?);

        let log_sink: Arc<dyn LogSink> = if !config.request_log.enabled() {
            tracing::info!("Request logging disabled by configuration");
            Arc::new(NoopLogSink)
        } else if let Some(uri) = config.request_log.read_uri() {
            Arc::new(MongoLogStore::new(uri, &config.request_log))
        } else {
            tracing::warn!(
                env_var = %config.request_log.uri_env(),
                "Document store URI is not set; request logging disabled"
            );
            Arc::new(NoopLogSink)
        };

        Self::from_parts(config, gateway, log_sink)
    }

    /// Create state from explicit collaborators
    pub fn from_parts(
        config: Arc<Config>,
        gateway: Arc<dyn ChatGateway>,
        log_sink: Arc<dyn LogSink>,
    ) -> AppResult<Self> {
        let metrics = Arc::new(
            Metrics::new()
                .map_err(|e| AppError::Internal(format!("failed to register metrics: {}", e)))?,
        );
        let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoding)?);
        let retry = RetryPolicy::new(config.llm.max_attempts(), config.llm.retry_backoff_ms())
            .map_err(|e| AppError::Config(e.to_string()))?;
        let request_log = RequestLogger::new(
            log_sink,
            metrics.clone(),
            Duration::from_secs(config.request_log.write_timeout_seconds()),
        );

        Ok(Self {
            config,
            gateway,
            geocoder,
            request_log,
            metrics,
            retry,
        })
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get reference to the LLM gateway
    pub fn gateway(&self) -> &dyn ChatGateway {
        self.gateway.as_ref()
    }

    /// Get reference to the geocoder
    pub fn geocoder(&self) -> &NominatimGeocoder {
        &self.geocoder
    }

    /// Get reference to the request logger
    pub fn request_log(&self) -> &RequestLogger {
        &self.request_log
    }

    /// Get reference to the metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get the gateway retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Upper bound for one API request, retries included
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.request_timeout_seconds)
    }

    /// Run a gateway completion with retry, the request deadline, and metrics
    pub(crate) async fn complete(
        &self,
        endpoint: Endpoint,
        prompt: &str,
        request_id: RequestId,
    ) -> Result<String, GatewayError> {
        let started = Instant::now();
        let deadline = self.request_timeout();

        let result = match tokio::time::timeout(
            deadline,
            complete_with_retry(self.gateway(), prompt, self.retry_policy(), request_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout {
                timeout_seconds: deadline.as_secs(),
            }),
        };

        self.metrics
            .observe_gateway_duration(endpoint, started.elapsed().as_secs_f64() * 1000.0);
        if let Err(e) = &result {
            self.metrics.gateway_failure(e.kind().as_str());
        }
        result
    }
}

/// Outcome label for a handler result
pub(crate) fn outcome_of<T>(result: &AppResult<T>) -> Outcome {
    match result {
        Ok(_) => Outcome::Success,
        Err(e) if e.status().is_client_error() => Outcome::ClientError,
        Err(_) => Outcome::ServerError,
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/metrics", get(metrics::handler))
        .route("/api/get-route", post(route::handler))
        .route("/api/get-tourist-spots", post(spots::handler))
        .route("/api/coordinates", get(coordinates::handler))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NeverGateway;

    #[async_trait]
    impl ChatGateway for NeverGateway {
        async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
            std::future::pending().await
        }

        fn has_credential(&self) -> bool {
            true
        }
    }

    fn test_config() -> Config {
        r#"
[server]
host = "127.0.0.1"
port = 3000
request_timeout_seconds = 1

[llm]
max_attempts = 3
"#
        .parse()
        .expect("should parse test config")
    }

    #[test]
    fn test_appstate_from_parts_applies_config() {
        let state = AppState::from_parts(
            Arc::new(test_config()),
            Arc::new(NeverGateway),
            Arc::new(NoopLogSink),
        )
        .unwrap();

        assert_eq!(state.config().server.port, 3000);
        assert_eq!(state.retry_policy().max_attempts(), 3);
        assert_eq!(state.request_timeout(), Duration::from_secs(1));
        assert_eq!(state.request_log().sink_name(), "disabled");
        assert!(state.gateway().has_credential());

        // Clone should work (cheap Arc clone)
        let cloned = state.clone();
        assert_eq!(cloned.config().server.port, 3000);
    }

    #[tokio::test]
    async fn test_complete_is_bounded_by_request_timeout() {
        let state = AppState::from_parts(
            Arc::new(test_config()),
            Arc::new(NeverGateway),
            Arc::new(NoopLogSink),
        )
        .unwrap();

        let err = state
            .complete(Endpoint::Route, "prompt", RequestId::new())
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::Timeout { timeout_seconds: 1 });
        assert_eq!(state.metrics().gateway_failures_count("network"), 1);
    }

    #[test]
    fn test_outcome_of_maps_status_classes() {
        assert_eq!(outcome_of(&Ok::<(), AppError>(())), Outcome::Success);
        assert_eq!(
            outcome_of::<()>(&Err(AppError::ClientInput("empty".to_string()))),
            Outcome::ClientError
        );
        assert_eq!(
            outcome_of::<()>(&Err(AppError::Internal("boom".to_string()))),
            Outcome::ServerError
        );
    }
}
