//! Display projection of a parsed itinerary
//!
//! Pure and total: every validated [`Itinerary`] formats, and every stop gets
//! the same set of display fields.

use super::{Itinerary, Measure, RouteStop};
use serde::{Deserialize, Serialize};

/// Placeholder rendered for absent optional fields
pub const UNKNOWN_PLACEHOLDER: &str = "不明";

/// Display-ready stop, all fields rendered to strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayStop {
    /// 1-based position in the route
    pub order: usize,
    pub destination: String,
    pub transport: String,
    pub distance: String,
    pub time_required: String,
    pub stay_duration: String,
}

/// Display-ready itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayItinerary {
    pub start: String,
    pub stops: Vec<DisplayStop>,
    pub end: String,
    pub total_distance: String,
    pub total_time: String,
}

/// Format an itinerary for presentation
pub fn format(itinerary: &Itinerary) -> DisplayItinerary {
    DisplayItinerary {
        start: text_or_unknown(itinerary.start.as_deref()),
        stops: itinerary
            .route
            .iter()
            .enumerate()
            .map(|(index, stop)| format_stop(index + 1, stop))
            .collect(),
        end: itinerary.end.clone(),
        total_distance: format_distance(itinerary.total_distance.as_ref()),
        total_time: format_duration(itinerary.total_time.as_ref()),
    }
}

fn format_stop(order: usize, stop: &RouteStop) -> DisplayStop {
    DisplayStop {
        order,
        destination: stop.destination.clone(),
        transport: text_or_unknown(stop.transport.as_deref()),
        distance: format_distance(stop.distance.as_ref()),
        time_required: format_duration(stop.time_required.as_ref()),
        stay_duration: format_duration(stop.stay_duration.as_ref()),
    }
}

/// Render a distance: numbers (including numeric text) in km, other text verbatim
pub fn format_distance(distance: Option<&Measure>) -> String {
    match distance {
        None => UNKNOWN_PLACEHOLDER.to_string(),
        Some(measure) => match measure.numeric_value() {
            Some(km) => format!("{} km", km),
            None => verbatim(measure),
        },
    }
}

/// Render a duration given in minutes
///
/// 60 minutes and above render as hours plus a minutes clause, which is left
/// out when the remainder is zero. Numeric text follows the same rules as
/// numbers; other text is rendered verbatim.
pub fn format_duration(duration: Option<&Measure>) -> String {
    let Some(measure) = duration else {
        return UNKNOWN_PLACEHOLDER.to_string();
    };
    let Some(minutes) = measure.numeric_value() else {
        return verbatim(measure);
    };

    // Round before splitting so 119.9999999 carries into the hour instead of
    // rendering a 60-minute remainder.
    let minutes = round_micro(minutes);
    if minutes < 60.0 {
        return format!("{} 分", minutes);
    }

    let hours = (minutes / 60.0).floor();
    // Float remainder noise (e.g. 150.3 % 60) would otherwise leak into the text.
    let remainder = round_micro(minutes - hours * 60.0);
    if remainder == 0.0 {
        format!("{}時間", hours)
    } else {
        format!("{}時間 {}分", hours, remainder)
    }
}

fn round_micro(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn verbatim(measure: &Measure) -> String {
    match measure {
        Measure::Number(value) => value.to_string(),
        Measure::Text(text) => text.clone(),
    }
}

fn text_or_unknown(text: Option<&str>) -> String {
    text.map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_PLACEHOLDER.to_string())
}
