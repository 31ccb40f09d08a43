//! Typed commands produced by the framer.

use camino::Utf8PathBuf;

use crate::compiler::SourceUnit;

/// One request read from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Compile a unit and report diagnostics.
    Lint(SourceUnit),
    /// Update session configuration. No response is written.
    Set(Setting),
    /// Stop serving and exit.
    Kill,
    /// Header with an unrecognised command name, kept verbatim.
    Unknown(String),
}

impl Command {
    /// Name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Lint(_) => "LINT",
            Self::Set(_) => "SET",
            Self::Kill => "KILL",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

/// Session property carried by `SET`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    /// `SET\tCLASSPATH\t<value>`.
    Classpath(String),
    /// `SET\tJDK\t<path>`; an empty path clears the location.
    ToolchainLocation(Option<Utf8PathBuf>),
}
