//! Parser for `javac` console diagnostics.
//!
//! `javac` reports each finding as a header line followed by optional
//! continuation lines:
//!
//! ```text
//! src/foo/Bar.java:3: error: cannot find symbol
//!     Baz b;
//!     ^
//!   symbol:   class Baz
//!   location: class Bar
//! 1 error
//! ```
//!
//! Located headers start with the exact path handed to `javac`. The line
//! after a located header is the echoed source and is never read as a header,
//! whatever it contains. The echoed line and caret are folded into the
//! column; the remaining continuation lines are appended to the message.
//! Count summaries close the current finding and are otherwise ignored.

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Parses combined compiler output for `source_file` into diagnostics,
/// preserving order.
///
/// `source_file` must be spelled as it was passed on the `javac` command line.
#[must_use]
pub fn parse_javac_output(output: &str, source_file: &str) -> Vec<Diagnostic> {
    let header_prefix = format!("{source_file}:");
    let mut diagnostics = Vec::new();
    let mut pending: Option<PendingDiagnostic> = None;

    for raw in output.lines() {
        let line = raw.trim_end_matches('\r');
        let echo_slot = pending
            .as_ref()
            .is_some_and(PendingDiagnostic::awaits_source_echo);
        let header = parse_located_header(line, &header_prefix).or_else(|| {
            if echo_slot {
                None
            } else {
                parse_bare_header(line)
            }
        });

        if let Some(header) = header {
            diagnostics.extend(pending.take().map(PendingDiagnostic::finish));
            pending = Some(header);
        } else if !echo_slot && is_summary(line) {
            diagnostics.extend(pending.take().map(PendingDiagnostic::finish));
        } else if let Some(current) = pending.as_mut() {
            current.continuation.push(line.to_owned());
        }
    }
    diagnostics.extend(pending.map(PendingDiagnostic::finish));
    diagnostics
}

#[derive(Debug)]
struct PendingDiagnostic {
    kind: DiagnosticKind,
    message: String,
    line: Option<u32>,
    continuation: Vec<String>,
}

impl PendingDiagnostic {
    fn new(kind: DiagnosticKind, message: &str, line: Option<u32>) -> Self {
        Self {
            kind,
            message: message.to_owned(),
            line,
            continuation: Vec::new(),
        }
    }

    /// A located finding whose echoed source line has not arrived yet.
    fn awaits_source_echo(&self) -> bool {
        self.line.is_some() && self.continuation.is_empty()
    }

    fn finish(self) -> Diagnostic {
        let Self {
            kind,
            mut message,
            line,
            mut continuation,
        } = self;

        let mut column = None;
        if let Some(caret_index) = continuation.iter().position(|text| is_caret(text)) {
            column = caret_column(&continuation.remove(caret_index));
            if let Some(echoed) = caret_index.checked_sub(1) {
                continuation.remove(echoed);
            }
        }

        for extra in continuation
            .iter()
            .map(|text| text.trim_end())
            .filter(|text| !text.is_empty())
        {
            message.push('\n');
            message.push_str(extra);
        }

        let mut diagnostic = Diagnostic::new(kind, message);
        if let Some(line) = line {
            diagnostic = diagnostic.at_line(line);
        }
        if let Some(column) = column {
            diagnostic = diagnostic.at_column(column);
        }
        diagnostic
    }
}

fn parse_bare_header(line: &str) -> Option<PendingDiagnostic> {
    let (kind, message) = split_kind(line)?;
    Some(PendingDiagnostic::new(kind, message, None))
}

fn parse_located_header(line: &str, prefix: &str) -> Option<PendingDiagnostic> {
    let rest = line.strip_prefix(prefix)?;
    let (number, tail) = rest.split_once(':')?;
    let line_number = number.parse::<u32>().ok()?;
    let tail = tail.strip_prefix(' ').unwrap_or(tail);
    let (kind, message) = split_kind(tail).unwrap_or((DiagnosticKind::Other, tail));
    Some(PendingDiagnostic::new(kind, message, Some(line_number)))
}

fn split_kind(text: &str) -> Option<(DiagnosticKind, &str)> {
    const PREFIXES: [(&str, DiagnosticKind); 4] = [
        ("error:", DiagnosticKind::Error),
        ("warning:", DiagnosticKind::Warning),
        ("note:", DiagnosticKind::Note),
        ("Note:", DiagnosticKind::Note),
    ];
    PREFIXES.iter().find_map(|(prefix, kind)| {
        text.strip_prefix(prefix)
            .map(|message| (*kind, message.trim_start()))
    })
}

fn is_summary(line: &str) -> bool {
    let Some((count, noun)) = line.trim().split_once(' ') else {
        return false;
    };
    count.parse::<u32>().is_ok() && matches!(noun, "error" | "errors" | "warning" | "warnings")
}

fn is_caret(line: &str) -> bool {
    line.trim() == "^"
}

fn caret_column(line: &str) -> Option<u32> {
    let offset = line.chars().position(|character| character == '^')?;
    u32::try_from(offset + 1).ok()
}
