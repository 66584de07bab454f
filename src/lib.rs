//! TripNavi - travel route planning service
//!
//! Looks up tourist spots near a place or coordinate and asks an LLM for a
//! multi-stop itinerary among selected spots. The LLM's reply is parsed
//! tolerantly into a typed [`itinerary::Itinerary`] and can be projected into
//! display strings.

pub mod cli;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod handlers;
pub mod itinerary;
pub mod llm;
pub mod metrics;
pub mod middleware;
pub mod request_log;
pub mod spots;
pub mod telemetry;
