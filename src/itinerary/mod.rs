//! Itinerary data model and the route-planning pipeline stages
//!
//! The pipeline is: [`prompt`] builds the LLM request text from waypoints,
//! [`parser`] turns the raw LLM reply into a validated [`Itinerary`], and
//! [`formatter`] projects an itinerary into display-ready strings.

use serde::{Deserialize, Serialize};

pub mod formatter;
pub mod parser;
pub mod prompt;

pub use formatter::{DisplayItinerary, DisplayStop, format};
pub use parser::{ParseError, parse};
pub use prompt::build_route_prompt;

/// A user-supplied place name, trimmed and guaranteed non-empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Waypoint(String);

impl Waypoint {
    /// Create a waypoint from raw input
    ///
    /// Returns `None` when the input is empty or whitespace-only.
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Build the ordered waypoint list from raw inputs, dropping blank entries
    ///
    /// Input order is preserved; it is the travel order hint given to the LLM.
    pub fn from_inputs<S: AsRef<str>>(inputs: &[S]) -> Vec<Self> {
        inputs
            .iter()
            .filter_map(|raw| Self::new(raw.as_ref()))
            .collect()
    }

    /// Get the place name
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A distance or duration value as the LLM reported it
///
/// Numbers carry an implicit unit (km for distances, minutes for durations).
/// Text carries its unit embedded (e.g. `"徒歩5分"`) and is never reinterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Measure {
    Number(f64),
    Text(String),
}

impl Measure {
    /// Numeric value of this measure, if it has one
    ///
    /// Text that is itself a plain finite number (e.g. `"45"`) counts as numeric.
    pub fn numeric_value(&self) -> Option<f64> {
        match self {
            Measure::Number(value) => Some(*value),
            Measure::Text(text) => parse_numeric(text),
        }
    }
}

/// Parse a string as a finite base-10 number
///
/// Surrounding whitespace is ignored. `"inf"`, `"NaN"` and anything carrying a
/// unit or other text yields `None`.
pub fn parse_numeric(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// One leg of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_required: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stay_duration: Option<Measure>,
}

impl RouteStop {
    /// Create a stop with only a destination
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            transport: None,
            distance: None,
            time_required: None,
            stay_duration: None,
        }
    }
}

/// Validated travel plan derived from an LLM response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    pub route: Vec<RouteStop>,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<Measure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<Measure>,
}
