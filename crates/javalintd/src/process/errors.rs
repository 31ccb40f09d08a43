//! Defines the error surface for daemon launch.

use std::io;

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

/// Errors surfaced while launching or running the daemon process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// Socket listener startup failed.
    #[error("daemon socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// The readiness token could not be written to stdout.
    #[error("failed to announce readiness: {source}")]
    Announce {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl LaunchError {
    /// Whether another process already owns the configured port.
    #[must_use]
    pub const fn is_port_in_use(&self) -> bool {
        match self {
            Self::Listener { source } => source.is_address_in_use(),
            _ => false,
        }
    }

    /// Process exit status for this failure.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.is_port_in_use() { 1 } else { 2 }
    }
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}
