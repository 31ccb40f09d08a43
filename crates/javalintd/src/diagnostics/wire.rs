//! Single-line response format.
//!
//! A successful `LINT` is answered with one JSON array:
//!
//! ```json
//! [{"message":"';' expected","line":"3","position":"17","type":"ERROR"}]
//! ```
//!
//! `line` and `position` are decimal strings, `-1` when the compiler gave no
//! position. Keys always appear in this order. Strings use standard JSON
//! escaping, so quotes and newlines inside messages never break the line.
//!
//! Rejected requests are answered with one JSON object instead:
//!
//! ```json
//! {"error":{"kind":"unknown_command","message":"unknown command 'FOO'"}}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Diagnostic, DiagnosticKind};

/// Position sentinel used when the compiler reported none.
pub const UNKNOWN_POSITION: &str = "-1";

/// One element of the diagnostics array as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDiagnostic {
    /// Compiler message.
    pub message: String,
    /// 1-based line, or `-1`.
    pub line: String,
    /// 1-based column, or `-1`.
    pub position: String,
    /// Diagnostic kind.
    #[serde(rename = "type")]
    pub kind: DiagnosticKind,
}

impl From<&Diagnostic> for WireDiagnostic {
    fn from(diagnostic: &Diagnostic) -> Self {
        Self {
            message: diagnostic.message().to_owned(),
            line: encode_position(diagnostic.line()),
            position: encode_position(diagnostic.column()),
            kind: diagnostic.kind(),
        }
    }
}

impl TryFrom<WireDiagnostic> for Diagnostic {
    type Error = WireError;

    fn try_from(record: WireDiagnostic) -> Result<Self, Self::Error> {
        let line = decode_position("line", &record.line)?;
        let column = decode_position("position", &record.position)?;
        let mut diagnostic = Self::new(record.kind, record.message);
        if let Some(line) = line {
            diagnostic = diagnostic.at_line(line);
        }
        if let Some(column) = column {
            diagnostic = diagnostic.at_column(column);
        }
        Ok(diagnostic)
    }
}

/// Body of an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable snake_case error identifier.
    pub kind: String,
    /// Human-readable description.
    pub message: String,
}

#[derive(Serialize, Deserialize)]
struct ErrorReply {
    error: ErrorBody,
}

/// Decoded response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// The request was linted.
    Diagnostics(Vec<Diagnostic>),
    /// The daemon refused the request.
    Rejected(ErrorBody),
}

/// Errors raised while decoding a response line.
#[derive(Debug, Error)]
pub enum WireError {
    /// The line was not valid JSON of either reply shape.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    /// A position field held something other than a 1-based integer or `-1`.
    #[error("invalid {field} value '{value}'")]
    InvalidPosition {
        /// Field name on the wire.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Renders diagnostics as a JSON array without a trailing newline.
///
/// # Errors
///
/// Returns the serialiser error; it cannot occur for well-formed UTF-8 input.
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> Result<String, serde_json::Error> {
    let records: Vec<WireDiagnostic> = diagnostics.iter().map(WireDiagnostic::from).collect();
    serde_json::to_string(&records)
}

/// Renders an error reply without a trailing newline.
///
/// # Errors
///
/// Returns the serialiser error; it cannot occur for well-formed UTF-8 input.
pub fn render_error(kind: &str, message: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&ErrorReply {
        error: ErrorBody {
            kind: kind.to_owned(),
            message: message.to_owned(),
        },
    })
}

/// Decodes a response line produced by [`render_diagnostics`] or
/// [`render_error`].
///
/// # Errors
///
/// Returns [`WireError`] when the line matches neither shape or carries an
/// invalid position.
pub fn parse_reply(line: &str) -> Result<Reply, WireError> {
    let trimmed = line.trim();
    if trimmed.starts_with('{') {
        let reply: ErrorReply = serde_json::from_str(trimmed)?;
        return Ok(Reply::Rejected(reply.error));
    }
    let records: Vec<WireDiagnostic> = serde_json::from_str(trimmed)?;
    let diagnostics = records
        .into_iter()
        .map(Diagnostic::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Reply::Diagnostics(diagnostics))
}

fn encode_position(value: Option<u32>) -> String {
    value.map_or_else(|| UNKNOWN_POSITION.to_owned(), |position| position.to_string())
}

fn decode_position(field: &'static str, value: &str) -> Result<Option<u32>, WireError> {
    if value == UNKNOWN_POSITION {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| WireError::InvalidPosition {
            field,
            value: value.to_owned(),
        })
}
