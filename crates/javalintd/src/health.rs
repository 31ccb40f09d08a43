//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use camino::Utf8Path;
use javalint_config::Config;

use crate::bootstrap::BootstrapError;
use crate::compiler::ToolchainError;
use crate::dispatch::DispatchError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a compiler was resolved for `location`.
    fn toolchain_ready(&self, location: Option<&Utf8Path>);

    /// Invoked when no compiler could be resolved. The daemon keeps serving.
    fn toolchain_unavailable(&self, location: Option<&Utf8Path>, error: &ToolchainError);

    /// Invoked once the listener is bound and accepting.
    fn listener_ready(&self, address: SocketAddr);

    /// Invoked when a request failed without a reply to the client.
    fn connection_failed(&self, error: &DispatchError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn toolchain_ready(&self, location: Option<&Utf8Path>) {
        (**self).toolchain_ready(location);
    }

    fn toolchain_unavailable(&self, location: Option<&Utf8Path>, error: &ToolchainError) {
        (**self).toolchain_unavailable(location, error);
    }

    fn listener_ready(&self, address: SocketAddr) {
        (**self).listener_ready(address);
    }

    fn connection_failed(&self, error: &DispatchError) {
        (**self).connection_failed(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn location_field(location: Option<&Utf8Path>) -> &str {
    location.map_or("<environment>", Utf8Path::as_str)
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            endpoint = %config.endpoint(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            classpath = config.classpath(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn toolchain_ready(&self, location: Option<&Utf8Path>) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "toolchain_ready",
            location = location_field(location),
            "java compiler ready"
        );
    }

    fn toolchain_unavailable(&self, location: Option<&Utf8Path>, error: &ToolchainError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "toolchain_unavailable",
            location = location_field(location),
            error = %error,
            "java compiler unavailable; LINT will report it as a diagnostic"
        );
    }

    fn listener_ready(&self, address: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            address = %address,
            "listening for lint requests"
        );
    }

    fn connection_failed(&self, error: &DispatchError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "connection_failed",
            kind = error.kind(),
            error = %error,
            error_debug = ?error,
            "request failed without a response"
        );
    }
}
