//! Place-name geocoding via Nominatim
//!
//! Used to enrich tourist spots with coordinates for map display. The
//! itinerary pipeline never depends on it.

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Errors from a geocoding lookup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodingError {
    #[error("geocoding request failed: {reason}")]
    Transport { reason: String },

    #[error("geocoding service returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error("geocoding response could not be read: {reason}")]
    InvalidResponse { reason: String },
}

/// One Nominatim search hit; coordinates arrive as strings
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Nominatim search client
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
}

impl NominatimGeocoder {
    /// Create a geocoder from configuration
    pub fn new(settings: &GeocodingConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent())
            .timeout(Duration::from_secs(settings.timeout_seconds()))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build geocoding HTTP client: {}", e)))?;

        Ok(Self {
            client,
            search_url: format!("{}/search", settings.base_url().trim_end_matches('/')),
        })
    }

    /// Look up the best match for a place name
    ///
    /// Returns `Ok(None)` when the service knows no such place.
    pub async fn lookup(&self, place: &str) -> Result<Option<Coordinates>, GeocodingError> {
        tracing::debug!(place = %place, "Geocoding place name");

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("q", place)])
            .send()
            .await
            .map_err(|e| GeocodingError::Transport {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let hits: Vec<SearchHit> =
            response
                .json()
                .await
                .map_err(|e| GeocodingError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        let Some(best) = hits.into_iter().next() else {
            tracing::warn!(place = %place, "No coordinates found for place");
            return Ok(None);
        };

        let coordinates = Coordinates {
            latitude: parse_coordinate("lat", &best.lat)?,
            longitude: parse_coordinate("lon", &best.lon)?,
        };

        tracing::debug!(
            place = %place,
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            "Resolved place coordinates"
        );
        Ok(Some(coordinates))
    }
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64, GeocodingError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeocodingError::InvalidResponse {
            reason: format!("`{}` is not a number: {:?}", field, raw),
        })
}
