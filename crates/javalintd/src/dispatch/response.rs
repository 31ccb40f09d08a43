//! Response writing for the dispatch loop.
//!
//! Every reply is exactly one line, written and flushed at once so the client
//! can treat the first newline as the end of the response.

use std::io::Write;

use crate::diagnostics::Diagnostic;
use crate::diagnostics::wire::{render_diagnostics, render_error};

use super::errors::DispatchError;

/// Writer that frames replies as single lines.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the diagnostics array for a `LINT` request.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_diagnostics(&mut self, diagnostics: &[Diagnostic]) -> Result<(), DispatchError> {
        let line = render_diagnostics(diagnostics)?;
        self.write_line(&line)
    }

    /// Writes an error object describing `error`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_error(&mut self, error: &DispatchError) -> Result<(), DispatchError> {
        let line = render_error(error.kind(), &error.to_string())?;
        self.write_line(&line)
    }

    fn write_line(&mut self, line: &str) -> Result<(), DispatchError> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
