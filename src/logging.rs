//! Subscriber setup for the command-line tool.
//!
//! Logs always go to stderr so stdout can carry JSON reports.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// How logs are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub json_format: bool,
}

impl LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub fn default_directives(&self) -> &'static str {
        if self.verbose {
            "info,redactai=debug"
        } else {
            "warn"
        }
    }
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_tracing(config: LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    let result = if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(config.verbose),
            )
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(
            verbose = config.verbose,
            json_format = config.json_format,
            "logging initialized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(LoggingConfig::default().default_directives(), "warn");
        let verbose = LoggingConfig {
            verbose: true,
            json_format: false,
        };
        assert_eq!(verbose.default_directives(), "info,redactai=debug");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing(LoggingConfig::default());
        init_tracing(LoggingConfig {
            verbose: true,
            json_format: true,
        });
    }
}
