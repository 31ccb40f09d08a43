//! Installs the process-wide `tracing` subscriber.
//!
//! Logs always go to stderr. Stdout belongs to the launch protocol, where the
//! editor waits for `RUNNING` or `PORT_USED`.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use javalint_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Marker that the subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Logging setup failures.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` directive list.
    #[error("log filter '{filter}' does not parse: {reason}")]
    Filter {
        /// Rejected directive list.
        filter: String,
        /// Parser message.
        reason: String,
    },
    /// Some other subscriber already owns the global slot.
    #[error("a global tracing subscriber is already installed: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the stderr subscriber once per process.
///
/// Repeated calls, such as one per test daemon, are no-ops.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter does not parse or another
/// subscriber is already installed.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install_subscriber(config))
        .map(|()| TelemetryHandle)
}

fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|error| TelemetryError::Filter {
        filter: directives.to_owned(),
        reason: error.to_string(),
    })
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let stderr_layer = fmt::Subscriber::builder()
        .with_env_filter(parse_filter(config.log_filter())?)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(stderr_layer.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(stderr_layer.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("javalintd=notalevel")]
    #[case("javalintd[=info")]
    fn rejects_unparseable_filter(#[case] directives: &str) {
        let error = parse_filter(directives).expect_err("filter should not parse");
        assert!(
            matches!(&error, TelemetryError::Filter { filter, .. } if filter == directives),
            "{error}"
        );
    }

    #[rstest]
    fn accepts_the_default_filter() {
        assert!(parse_filter(Config::default().log_filter()).is_ok());
    }
}
