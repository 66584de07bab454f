//! Error types for TripNavi
//!
//! [`AppError`] implements `IntoResponse` for Axum handlers. The response body
//! is always the uniform failure envelope `{ "success": false, "message": .. }`
//! carrying a fixed user-facing message; error detail stays in server logs.

use crate::geocoding::GeocodingError;
use crate::itinerary::ParseError;
use crate::llm::GatewayError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Shown when required location input is missing
pub const ENTER_LOCATION_MESSAGE: &str = "場所を入力してください";
/// Shown for any route-planning failure
pub const ROUTE_FAILED_MESSAGE: &str = "ルートの取得に失敗しました";
/// Shown for any tourist-spot lookup failure
pub const SPOTS_FAILED_MESSAGE: &str = "観光地の取得に失敗しました";
/// Shown for any geocoding failure
pub const GEOCODING_FAILED_MESSAGE: &str = "座標の取得に失敗しました";
/// Shown for configuration and internal failures
pub const INTERNAL_ERROR_MESSAGE: &str = "サーバーエラーが発生しました";

/// Why a route-planning request failed after input validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteFailure {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read configuration file {path}: {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML configuration {path}: {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in {path}: {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    #[error("Invalid request: {0}")]
    ClientInput(String),

    #[error("Route planning failed: {0}")]
    RoutePlanning(#[from] RouteFailure),

    #[error("Tourist spot lookup failed: {0}")]
    TouristSpots(#[source] GatewayError),

    #[error("Geocoding failed: {0}")]
    Geocoding(#[from] GeocodingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ClientInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed, localized message shown to the client
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ClientInput(_) => ENTER_LOCATION_MESSAGE,
            Self::RoutePlanning(_) => ROUTE_FAILED_MESSAGE,
            Self::TouristSpots(_) => SPOTS_FAILED_MESSAGE,
            Self::Geocoding(_) => GEOCODING_FAILED_MESSAGE,
            Self::Config(_)
            | Self::ConfigFileRead { .. }
            | Self::ConfigParseFailed { .. }
            | Self::ConfigValidationFailed { .. }
            | Self::Internal(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// The failure envelope sent to the client
    pub fn envelope(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "message": self.user_message(),
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn network_failure() -> GatewayError {
        GatewayError::Network {
            reason: "dns error: api.internal.example".to_string(),
        }
    }

    #[test]
    fn test_config_error_creates() {
        let err = AppError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_client_input_is_bad_request() {
        let err = AppError::ClientInput("locations is empty".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), ENTER_LOCATION_MESSAGE);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_route_failures_share_one_message() {
        let gateway = AppError::from(RouteFailure::from(network_failure()));
        let parse = AppError::from(RouteFailure::from(ParseError::MalformedJson {
            reason: "expected value".to_string(),
        }));
        for err in [gateway, parse] {
            assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(err.user_message(), ROUTE_FAILED_MESSAGE);
        }
    }

    #[test]
    fn test_envelope_hides_detail() {
        let err = AppError::TouristSpots(network_failure());
        let envelope = err.envelope();
        assert_eq!(envelope["success"], false);
        assert_eq!(envelope["message"], SPOTS_FAILED_MESSAGE);
        assert!(!envelope.to_string().contains("api.internal.example"));
        // Detail is still available server-side
        assert!(err.to_string().contains("api.internal.example"));
    }

    #[test]
    fn test_route_failure_keeps_source_chain() {
        let err = AppError::from(RouteFailure::from(network_failure()));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_internal_error_response_status() {
        let err = AppError::Internal("test".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
