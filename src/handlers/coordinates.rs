//! Geocoding endpoint
//!
//! Handles `GET /api/coordinates?place=<name>`.

use crate::error::{AppError, AppResult};
use crate::geocoding::Coordinates;
use crate::handlers::{AppState, outcome_of};
use crate::metrics::Endpoint;
use crate::middleware::RequestId;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

/// Query parameters for the coordinates endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinatesQuery {
    #[serde(default)]
    pub place: Option<String>,
}

/// Coordinates response; `data` is null when the place is unknown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatesResponse {
    pub success: bool,
    pub data: Option<Coordinates>,
}

/// Coordinates handler
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<CoordinatesQuery>,
) -> AppResult<Json<CoordinatesResponse>> {
    let result = resolve(&state, request_id, query.place.as_deref()).await;
    state
        .metrics()
        .record_request(Endpoint::Coordinates, outcome_of(&result));

    result.map(|data| {
        Json(CoordinatesResponse {
            success: true,
            data,
        })
    })
}

async fn resolve(
    state: &AppState,
    request_id: RequestId,
    place: Option<&str>,
) -> AppResult<Option<Coordinates>> {
    let Some(place) = place.map(str::trim).filter(|place| !place.is_empty()) else {
        return Err(AppError::ClientInput("place is required".to_string()));
    };

    state.geocoder().lookup(place).await.map_err(|e| {
        tracing::warn!(
            request_id = %request_id,
            place = %place,
            error = %e,
            "Geocoding failed"
        );
        AppError::from(e)
    })
}
