//! Telemetry setup
//!
//! Configures structured logging with tracing and tracing-subscriber.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Filter directives used when `RUST_LOG` is not set
pub fn default_directives(default_level: &str) -> String {
    format!("tripnavi={},tower_http=debug", default_level)
}

/// Initialize the tracing subscriber
///
/// Only the first call per process has any effect. `RUST_LOG` overrides the
/// configured level.
///
/// # Examples
///
/// ```no_run
/// tripnavi::telemetry::init("info");
/// tracing::info!("Application started");
/// ```
pub fn init(default_level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_scope_crate_and_tower_http() {
        assert_eq!(
            default_directives("warn"),
            "tripnavi=warn,tower_http=debug"
        );
    }

    #[test]
    fn test_default_directives_parse_as_filter() {
        assert!(EnvFilter::try_new(default_directives("debug")).is_ok());
    }
}
