//! Route planning endpoint
//!
//! Handles `POST /api/get-route`: waypoints go through the prompt builder,
//! the gateway, and the tolerant parser. The parsed [`Itinerary`] is returned
//! as-is; `?view=display` also attaches the formatted projection.

use crate::error::{AppError, AppResult, RouteFailure};
use crate::handlers::extractor::ApiJson;
use crate::handlers::{AppState, outcome_of};
use crate::itinerary::parser::preview;
use crate::itinerary::{DisplayItinerary, Itinerary, Waypoint, build_route_prompt, format, parse};
use crate::metrics::Endpoint;
use crate::middleware::RequestId;
use crate::request_log::LogRecord;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Request path, also used as the log record's endpoint
pub const ROUTE_PATH: &str = "/api/get-route";

/// Characters of raw LLM output kept in parse-failure logs
const RAW_PREVIEW_CHARS: usize = 500;

/// Route request from client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Query parameters for the route endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteQuery {
    /// `display` adds the formatted itinerary to the response
    #[serde(default)]
    pub view: Option<String>,
}

impl RouteQuery {
    fn wants_display(&self) -> bool {
        self.view.as_deref() == Some("display")
    }
}

/// Successful route response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub success: bool,
    pub route: Itinerary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayItinerary>,
}

/// Route planning handler
///
/// Bodies that fail to deserialize are answered with the same client-error
/// envelope as an empty location list, and are counted and logged like it.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<RouteQuery>,
    payload: Result<ApiJson<RouteRequest>, AppError>,
) -> AppResult<Json<RouteResponse>> {
    let (logged_request, result) = match payload {
        Ok(ApiJson(request)) => {
            let result = plan_route(&state, request_id, &request.locations)
                .await
                .map(|itinerary| RouteResponse {
                    success: true,
                    display: query.wants_display().then(|| format(&itinerary)),
                    route: itinerary,
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
        .record_request(Endpoint::Route, outcome_of(&result));

    let logged_response = match &result {
        Ok(response) => serde_json::to_value(response).unwrap_or(serde_json::Value::Null),
        Err(e) => e.envelope(),
    };
    state.request_log().record(LogRecord::new(
        ROUTE_PATH,
        request_id,
        logged_request,
        logged_response,
    ));

    result.map(Json)
}

/// Builder → gateway → parser
async fn plan_route(
    state: &AppState,
    request_id: RequestId,
    locations: &[String],
) -> AppResult<Itinerary> {
    let waypoints = Waypoint::from_inputs(locations);
    if waypoints.is_empty() {
        tracing::debug!(
            request_id = %request_id,
            received = locations.len(),
            "Rejecting route request without usable locations"
        );
        return Err(AppError::ClientInput(
            "at least one non-blank location is required".to_string(),
        ));
    }

    let started = Instant::now();
    let prompt = build_route_prompt(&waypoints);
    tracing::debug!(
        request_id = %request_id,
        waypoint_count = waypoints.len(),
        prompt_chars = prompt.chars().count(),
        "Requesting itinerary from LLM"
    );

    let raw = match state.complete(Endpoint::Route, &prompt, request_id).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                error_kind = e.kind().as_str(),
                error = %e,
                "Route planning failed at the LLM gateway"
            );
            return Err(RouteFailure::from(e).into());
        }
    };

    match parse(&raw) {
        Ok(itinerary) => {
            tracing::info!(
                request_id = %request_id,
                stop_count = itinerary.route.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Route planned"
            );
            Ok(itinerary)
        }
        Err(e) => {
            state.metrics().parse_failure(e.kind());
            tracing::error!(
                request_id = %request_id,
                error_kind = e.kind(),
                error = %e,
                raw_chars = raw.chars().count(),
                raw_preview = %preview(&raw, RAW_PREVIEW_CHARS),
                "LLM itinerary reply could not be parsed"
            );
            Err(RouteFailure::from(e).into())
        }
    }
}
