//! Command-line interface for TripNavi
//!
//! Provides argument parsing and subcommand handling for the TripNavi binary.

use clap::{Parser, Subcommand};

/// Travel route planning service
#[derive(Parser)]
#[command(name = "tripnavi")]
#[command(version)]
#[command(about = "Travel route planning service backed by an LLM")]
#[command(
    long_about = "TripNavi looks up tourist spots near a place or coordinate and asks an \
    LLM for a multi-stop itinerary among the spots you pick."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# TripNavi Configuration
# ======================
#
# Only [server] is required; every other section falls back to the defaults
# shown here. Secrets are never written to this file: it names the
# environment variables that hold them.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Upper bound for one API request, retries included
request_timeout_seconds = 90

# ─────────────────────────────────────────────────────────────────────────────
# LLM (OpenAI-compatible chat completions)
# ─────────────────────────────────────────────────────────────────────────────

[llm]
base_url = "https://api.openai.com/v1"
model = "gpt-3.5-turbo"

# Environment variable holding the API key. Without it the server still
# starts, but every route or tourist-spot request fails fast.
api_key_env = "OPENAI_API_KEY"

# Per-attempt timeout
timeout_seconds = 60

# Attempts per request (1-5). Only transport failures are retried.
max_attempts = 2

# Base backoff, doubled on each retry and capped at 5 seconds
retry_backoff_ms = 250

# ─────────────────────────────────────────────────────────────────────────────
# GEOCODING (Nominatim)
# ─────────────────────────────────────────────────────────────────────────────

[geocoding]
base_url = "https://nominatim.openstreetmap.org"
# Nominatim's usage policy requires an identifying User-Agent
user_agent = "tripnavi"
timeout_seconds = 10

# ─────────────────────────────────────────────────────────────────────────────
# REQUEST LOG (MongoDB)
# ─────────────────────────────────────────────────────────────────────────────

[request_log]
enabled = true
# Environment variable holding the connection string. If unset, request
# logging is disabled.
uri_env = "MONGODB_URI"
database = "tripnavi"
collection = "logs"
write_timeout_seconds = 5

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error" (RUST_LOG overrides)
log_level = "info"

# Prometheus metrics are always available at /metrics on the server port
"#
}
