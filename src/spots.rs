//! Tourist-spot lookup queries
//!
//! A lookup is keyed either by a place name or by a coordinate pair. The
//! reply is free text from the LLM and is passed through to the client
//! unparsed.

use serde::Serialize;

/// What to search around
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpotQuery {
    Place { location: String },
    Coordinates { lat: f64, lon: f64 },
}

impl SpotQuery {
    /// Build a query from raw request fields
    ///
    /// A non-blank `location` wins. Otherwise both `lat` and `lon` must be
    /// finite and within WGS84 range. Returns `None` when neither form is
    /// usable.
    pub fn from_parts(location: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        if let Some(place) = location.map(str::trim).filter(|place| !place.is_empty()) {
            return Some(Self::Place {
                location: place.to_string(),
            });
        }

        match (lat, lon) {
            (Some(lat), Some(lon)) if valid_latitude(lat) && valid_longitude(lon) => {
                Some(Self::Coordinates { lat, lon })
            }
            _ => None,
        }
    }

    /// Prompt asking the LLM for attractions matching this query
    pub fn prompt(&self) -> String {
        match self {
            Self::Place { location } => {
                format!("Give me the top tourist attractions in {}.", location)
            }
            Self::Coordinates { lat, lon } => format!(
                "Give me the top tourist attractions near latitude {}, longitude {}.",
                lat, lon
            ),
        }
    }
}

fn valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

fn valid_longitude(lon: f64) -> bool {
    lon.is_finite() && (-180.0..=180.0).contains(&lon)
}
