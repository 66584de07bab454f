//! Tolerant parsing of LLM itinerary replies
//!
//! The LLM is asked for a JSON object but regularly wraps it in prose or code
//! fences, mixes numbers with unit-bearing strings, and omits fields. Parsing
//! runs in four steps:
//!
//! 1. isolate the outermost JSON region and parse it strictly
//! 2. require an object with an array-valued `route`
//! 3. keep only stops with a non-empty `destination`
//! 4. type numeric-or-string fields without losing information
//!
//! Any failure is a hard failure: no partially-valid itinerary is returned.

use super::{Itinerary, Measure, RouteStop, parse_numeric};
use serde_json::{Map, Value};

/// Why an LLM reply could not be turned into an itinerary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// No balanced JSON region, or the region is not valid JSON
    #[error("LLM reply is not valid JSON: {reason}")]
    MalformedJson { reason: String },

    /// Valid JSON, but not shaped like an itinerary
    #[error("LLM reply has an invalid itinerary shape: {reason}")]
    InvalidShape { reason: String },
}

impl ParseError {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::MalformedJson { .. } => "malformed_json",
            ParseError::InvalidShape { .. } => "invalid_shape",
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedJson {
            reason: reason.into(),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        ParseError::InvalidShape {
            reason: reason.into(),
        }
    }
}

/// Parse a raw LLM reply into a validated itinerary
pub fn parse(raw: &str) -> Result<Itinerary, ParseError> {
    let region = isolate_json_region(raw)
        .ok_or_else(|| ParseError::malformed("no balanced JSON object or array found"))?;

    let value: Value =
        serde_json::from_str(region).map_err(|e| ParseError::malformed(e.to_string()))?;

    let object = match value {
        Value::Object(object) => object,
        // A bare array could be a route or a list of alternatives; don't guess.
        Value::Array(_) => {
            return Err(ParseError::invalid(
                "top-level JSON value is an array, expected an object",
            ));
        }
        other => {
            return Err(ParseError::invalid(format!(
                "top-level JSON value is {}, expected an object",
                json_type_name(&other)
            )));
        }
    };

    let route_values = match object.get("route") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ParseError::invalid(format!(
                "`route` is {}, expected an array",
                json_type_name(other)
            )));
        }
        None => return Err(ParseError::invalid("`route` field is missing")),
    };

    let start = text_field(&object, "start");
    let end = text_field(&object, "end");

    let route: Vec<RouteStop> = route_values
        .iter()
        .enumerate()
        .filter_map(|(index, item)| normalize_stop(index, item))
        .collect();

    if route.is_empty() {
        if !route_values.is_empty() {
            return Err(ParseError::invalid(format!(
                "all {} route stops lacked a destination",
                route_values.len()
            )));
        }
        // An explicitly empty route is only trusted with both endpoints present.
        return match (start, end) {
            (Some(start), Some(end)) => Ok(Itinerary {
                start: Some(start),
                route,
                end,
                total_distance: measure_field(&object, "total_distance"),
                total_time: measure_field(&object, "total_time"),
            }),
            _ => Err(ParseError::invalid(
                "`route` is empty and `start`/`end` are not both present",
            )),
        };
    }

    let end = match end {
        Some(end) => end,
        None => {
            let last = route
                .last()
                .map(|stop| stop.destination.clone())
                .unwrap_or_default();
            tracing::debug!(
                fallback_end = %last,
                "Itinerary has no `end`, using last stop destination"
            );
            last
        }
    };

    Ok(Itinerary {
        start,
        route,
        end,
        total_distance: measure_field(&object, "total_distance"),
        total_time: measure_field(&object, "total_time"),
    })
}

/// Locate the outermost JSON object or array inside free text
///
/// Starts at the first `{` or `[` and ends at the last matching closer. Both
/// delimiters are ASCII, so the returned slice always lies on char boundaries.
pub(crate) fn isolate_json_region(raw: &str) -> Option<&str> {
    let start = raw.find(['{', '['])?;
    let closer = if raw.as_bytes()[start] == b'{' { '}' } else { ']' };
    let end = raw.rfind(closer)?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Normalize one `route` element, returning `None` when it must be dropped
fn normalize_stop(index: usize, item: &Value) -> Option<RouteStop> {
    let Some(fields) = item.as_object() else {
        tracing::debug!(
            stop_index = index,
            found = json_type_name(item),
            "Dropping route stop that is not an object"
        );
        return None;
    };

    let Some(destination) = text_field(fields, "destination") else {
        tracing::debug!(
            stop_index = index,
            "Dropping route stop without a destination"
        );
        return None;
    };

    Some(RouteStop {
        destination,
        transport: text_field(fields, "transport"),
        distance: measure_field(fields, "distance"),
        time_required: measure_field(fields, "time_required"),
        stay_duration: measure_field(fields, "stay_duration"),
    })
}

/// A trimmed, non-empty string field; any other type counts as absent
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// A number-or-string field
///
/// Numbers are kept as-is, numeric strings become numbers, and any other
/// string is kept verbatim (untrimmed) since it already carries its unit.
/// Whitespace is ignored only when deciding whether the string is blank or
/// numeric.
fn measure_field(fields: &Map<String, Value>, key: &str) -> Option<Measure> {
    match fields.get(key)? {
        Value::Number(number) => number.as_f64().map(Measure::Number),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else if let Some(value) = parse_numeric(trimmed) {
                Some(Measure::Number(value))
            } else {
                Some(Measure::Text(text.clone()))
            }
        }
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Truncated, char-boundary-safe preview of raw LLM text for logs
pub fn preview(raw: &str, max_chars: usize) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}... [truncated]", head)
    } else {
        head
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
