//! Tourist-spot lookup endpoint
//!
//! Handles `POST /api/get-tourist-spots`. The LLM reply is free text and is
//! returned to the client unparsed.

use crate::error::{AppError, AppResult};
use crate::handlers::extractor::ApiJson;
use crate::handlers::{AppState, outcome_of};
use crate::metrics::Endpoint;
use crate::middleware::RequestId;
use crate::request_log::LogRecord;
use crate::spots::SpotQuery;
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

/// Request path, also used as the log record's endpoint
pub const SPOTS_PATH: &str = "/api/get-tourist-spots";

/// Tourist-spot request from client
///
/// Either `location` or both `lat` and `lon`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpotsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Successful tourist-spot response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotsResponse {
    pub success: bool,
    pub data: String,
}

/// Tourist-spot handler
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<ApiJson<SpotsRequest>, AppError>,
) -> AppResult<Json<SpotsResponse>> {
    let (logged_request, result) = match payload {
        Ok(ApiJson(request)) => {
            let result = find_spots(&state, request_id, &request)
                .await
                .map(|data| SpotsResponse {
                    success: true,
                    data,
                });
            (
                serde_json::to_value(&request).unwrap_or(serde_json::Value::Null),
                result,
            )
        }
        Err(e) => (serde_json::Value::Null, Err(e)),
    };

    state
        .metrics()
        .record_request(Endpoint::TouristSpots, outcome_of(&result));

    let logged_response = match &result {
        Ok(response) => serde_json::to_value(response).unwrap_or(serde_json::Value::Null),
        Err(e) => e.envelope(),
    };
    state.request_log().record(LogRecord::new(
        SPOTS_PATH,
        request_id,
        logged_request,
        logged_response,
    ));

    result.map(Json)
}

async fn find_spots(
    state: &AppState,
    request_id: RequestId,
    request: &SpotsRequest,
) -> AppResult<String> {
    let Some(query) = SpotQuery::from_parts(request.location.as_deref(), request.lat, request.lon)
    else {
        tracing::debug!(
            request_id = %request_id,
            "Rejecting tourist-spot request without a location or valid coordinates"
        );
        return Err(AppError::ClientInput(
            "a location or a latitude/longitude pair is required".to_string(),
        ));
    };

    match state
        .complete(Endpoint::TouristSpots, &query.prompt(), request_id)
        .await
    {
        Ok(data) => {
            tracing::info!(
                request_id = %request_id,
                content_chars = data.chars().count(),
                "Tourist spots retrieved"
            );
            Ok(data)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error_kind = e.kind().as_str(),
                error = %e,
                "Tourist-spot lookup failed at the LLM gateway"
            );
            Err(AppError::TouristSpots(e))
        }
    }
}
