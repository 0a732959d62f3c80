//! Logging for Folio
//!
//! Installs a `tracing-subscriber` registry writing human-readable or JSON
//! lines, filtered by `RUST_LOG` or the configured directive.

use folio_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;

/// Initialize logging from configuration
///
/// `RUST_LOG` takes precedence over `telemetry.log_filter`. An unparsable
/// directive falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed
pub fn init(config: &TelemetryConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.log_filter);

    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true);

            registry.with(fmt_layer).try_init()
        }
    }
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn build_filter(env_directive: Option<&str>, configured: &str) -> EnvFilter {
    env_directive
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .or_else(|| EnvFilter::try_new(configured).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directive_wins() {
        let filter = build_filter(Some("folio_server=trace"), "warn");
        assert_eq!(filter.to_string(), "folio_server=trace");
    }

    #[test]
    fn configured_directive_used_without_env() {
        assert_eq!(build_filter(None, "folio=debug").to_string(), "folio=debug");
        assert_eq!(build_filter(Some("  "), "warn").to_string(), "warn");
    }

    #[test]
    fn invalid_directives_fall_back_to_info() {
        assert_eq!(build_filter(None, "folio=notalevel").to_string(), "info");
    }
}
