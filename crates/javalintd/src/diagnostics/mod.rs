//! Compiler findings and their single-line wire rendering.
//!
//! A [`Diagnostic`] is produced by a compilation invoker for one `LINT`
//! request and discarded once the response line is written. The [`wire`]
//! module owns the response format shared by the daemon and its client.

pub mod wire;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity reported by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    /// The unit does not compile.
    Error,
    /// The unit compiles but the compiler flagged a problem.
    Warning,
    /// Informational output such as unchecked-operation notes.
    Note,
    /// Anything the compiler did not classify.
    Other,
}

impl DiagnosticKind {
    /// Returns the wire spelling of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Note => "NOTE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A single compiler finding.
///
/// Line and column are 1-based. `None` means the compiler reported no
/// position, which happens for command-line warnings and summary notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    line: Option<u32>,
    column: Option<u32>,
}

impl Diagnostic {
    /// Creates a diagnostic without a source position.
    #[must_use]
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Attaches a line number.
    #[must_use]
    pub const fn at_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    /// Attaches a column number.
    #[must_use]
    pub const fn at_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    /// Synthetic finding returned when no compiler could be resolved.
    #[must_use]
    pub fn toolchain_unavailable(reason: impl fmt::Display) -> Self {
        Self::new(
            DiagnosticKind::Error,
            format!("no Java compiler available: {reason}"),
        )
    }

    /// Severity of the finding.
    #[must_use]
    pub const fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Human-readable message, possibly spanning several lines.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 1-based line, when known.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        self.line
    }

    /// 1-based column, when known.
    #[must_use]
    pub const fn column(&self) -> Option<u32> {
        self.column
    }
}
