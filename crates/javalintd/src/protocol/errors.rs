//! Framing errors raised while reading a request.

use std::io;

use thiserror::Error;

use crate::compiler::UnitNameError;

/// A request that could not be turned into a [`super::Command`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Reading from the connection failed.
    #[error("failed to read request: {0}")]
    Io(#[source] io::Error),
    /// The client went quiet for longer than the read timeout.
    #[error("timed out waiting for request data")]
    Timeout,
    /// The stream ended before the `END` line.
    #[error("request body ended without an END line")]
    UnterminatedBody,
    /// The header lacked a token the command needs.
    #[error("{command} requires {expected}")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Description of the missing token.
        expected: &'static str,
    },
    /// `SET` named a property the daemon does not know.
    #[error("unknown SET property '{0}'")]
    UnknownProperty(String),
    /// The `LINT` unit name was rejected.
    #[error(transparent)]
    InvalidUnitName(#[from] UnitNameError),
    /// The header line was not valid UTF-8.
    #[error("request header is not valid UTF-8")]
    InvalidEncoding,
}

impl ProtocolError {
    /// Stable identifier used in error responses.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Timeout => "timeout",
            Self::UnterminatedBody => "unterminated_body",
            Self::MissingArgument { .. } => "missing_argument",
            Self::UnknownProperty(_) => "unknown_property",
            Self::InvalidUnitName(_) => "invalid_unit_name",
            Self::InvalidEncoding => "invalid_encoding",
        }
    }

    pub(crate) fn from_io(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(error),
        }
    }
}
