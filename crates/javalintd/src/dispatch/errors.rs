//! Error types for request dispatch failures.

use std::io;

use thiserror::Error;

use crate::compiler::InvocationError;
use crate::protocol::ProtocolError;

/// Errors surfaced while reading, dispatching, or answering a request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request could not be framed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The header named no known command.
    #[error("unknown command '{header}'")]
    UnknownCommand {
        /// Header line as received.
        header: String,
    },

    /// The compiler could not be run for a unit.
    #[error("compilation of {unit} failed: {source}")]
    Invocation {
        /// Dotted unit name.
        unit: String,
        /// Underlying invoker error.
        #[source]
        source: InvocationError,
    },

    /// Writing the response failed.
    #[error("failed to write response: {0}")]
    Io(#[from] io::Error),

    /// Response serialization failed.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl DispatchError {
    /// Stable snake_case identifier used in error responses and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Protocol(error) => error.kind(),
            Self::UnknownCommand { .. } => "unknown_command",
            Self::Invocation { .. } => "invocation_failed",
            Self::Io(_) => "io",
            Self::Serialize(_) => "serialize",
        }
    }

    /// Whether the client should receive an error line.
    ///
    /// Broken connections cannot carry one. Invocation failures close the
    /// connection silently and are logged instead.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Protocol(ProtocolError::Io(_)) => false,
            Self::Protocol(_) | Self::UnknownCommand { .. } => true,
            Self::Invocation { .. } | Self::Io(_) | Self::Serialize(_) => false,
        }
    }

    /// Creates an unknown command error.
    pub fn unknown_command(header: impl Into<String>) -> Self {
        Self::UnknownCommand {
            header: header.into(),
        }
    }
}
