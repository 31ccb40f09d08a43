//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::net::SocketAddr;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use javalint_config::Config;

use crate::bootstrap::BootstrapError;
use crate::compiler::ToolchainError;
use crate::dispatch::DispatchError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// A compiler was resolved for the given location.
    ToolchainReady(Option<Utf8PathBuf>),
    /// Resolution failed with an error description.
    ToolchainUnavailable(String),
    /// The listener bound the given address.
    ListenerReady(SocketAddr),
    /// A request failed silently; carries the error kind.
    ConnectionFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    pub fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn toolchain_ready(&self, location: Option<&Utf8Path>) {
        self.record(HealthEvent::ToolchainReady(location.map(Utf8Path::to_path_buf)));
    }

    fn toolchain_unavailable(&self, _location: Option<&Utf8Path>, error: &ToolchainError) {
        self.record(HealthEvent::ToolchainUnavailable(error.to_string()));
    }

    fn listener_ready(&self, address: SocketAddr) {
        self.record(HealthEvent::ListenerReady(address));
    }

    fn connection_failed(&self, error: &DispatchError) {
        self.record(HealthEvent::ConnectionFailed(error.kind().to_owned()));
    }
}
