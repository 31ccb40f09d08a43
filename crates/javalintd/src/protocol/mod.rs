//! Line-oriented request framing.
//!
//! Each connection carries one request. The first line is a header whose
//! fields are separated by tabs; the first field names the command:
//!
//! ```text
//! LINT\tfoo.Bar
//! SET\tCLASSPATH\t/opt/lib/a.jar:/opt/lib/b.jar
//! SET\tJDK\t/usr/lib/jvm/java-21
//! KILL
//! ```
//!
//! `LINT` is followed by the unit source, one line at a time, and a line that
//! is exactly `END`. Lines end with `\n`; a trailing `\r` is dropped.

mod command;
mod errors;

use std::io::BufRead;

use camino::Utf8PathBuf;

use crate::compiler::SourceUnit;

pub use self::command::{Command, Setting};
pub use self::errors::ProtocolError;

/// Separator between header fields.
pub const FIELD_DELIMITER: char = '\t';
/// Line that terminates a `LINT` body.
pub const BODY_SENTINEL: &str = "END";

const LINT: &str = "LINT";
const LINT_PREFIX: &[u8] = b"LINT\t";
const SET: &str = "SET";
const KILL: &str = "KILL";
const CLASSPATH: &str = "CLASSPATH";
const JDK: &str = "JDK";

/// Reads one framed command from a buffered stream.
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
}

impl<R: BufRead> RequestReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next command.
    ///
    /// Returns `Ok(None)` when the stream ends before any header byte. A
    /// `LINT` body is always consumed up to its sentinel before the header
    /// arguments are validated, so an error reply never races unread input.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] for I/O failures, timeouts, missing or
    /// invalid header arguments, and bodies without an `END` line.
    pub fn read_command(&mut self) -> Result<Option<Command>, ProtocolError> {
        let Some(raw_header) = self.read_line()? else {
            return Ok(None);
        };
        let header = match String::from_utf8(raw_header) {
            Ok(header) => header,
            Err(error) => {
                if error.as_bytes().starts_with(LINT_PREFIX) {
                    self.read_body()?;
                }
                return Err(ProtocolError::InvalidEncoding);
            }
        };
        let mut fields = header.splitn(3, FIELD_DELIMITER);
        let method = fields.next().unwrap_or_default();

        let command = match method {
            LINT => {
                let name = fields.next();
                let body = self.read_body()?;
                let name = name.ok_or(ProtocolError::MissingArgument {
                    command: LINT,
                    expected: "a unit name",
                })?;
                Command::Lint(SourceUnit::new(name, body)?)
            }
            SET => Command::Set(parse_setting(fields.next(), fields.next())?),
            KILL => Command::Kill,
            _ => Command::Unknown(header.clone()),
        };
        Ok(Some(command))
    }

    /// Reads body lines up to the sentinel. Bytes that are not UTF-8, such as
    /// Latin-1 accents in comments, become U+FFFD.
    fn read_body(&mut self) -> Result<String, ProtocolError> {
        let mut body = String::new();
        loop {
            match self.read_line()? {
                None => return Err(ProtocolError::UnterminatedBody),
                Some(line) if line == BODY_SENTINEL.as_bytes() => return Ok(body),
                Some(line) => {
                    body.push_str(&String::from_utf8_lossy(&line));
                    body.push('\n');
                }
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, ProtocolError> {
        let mut buffer = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buffer)
            .map_err(ProtocolError::from_io)?;
        if read == 0 {
            return Ok(None);
        }
        if buffer.last() == Some(&b'\n') {
            buffer.pop();
        }
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
        Ok(Some(buffer))
    }
}

fn parse_setting(property: Option<&str>, value: Option<&str>) -> Result<Setting, ProtocolError> {
    let property = property.ok_or(ProtocolError::MissingArgument {
        command: SET,
        expected: "a property name",
    })?;
    if !matches!(property, CLASSPATH | JDK) {
        return Err(ProtocolError::UnknownProperty(property.to_owned()));
    }
    let value = value.ok_or(ProtocolError::MissingArgument {
        command: SET,
        expected: "a value",
    })?;
    Ok(if property == CLASSPATH {
        Setting::Classpath(value.to_owned())
    } else if value.is_empty() {
        Setting::ToolchainLocation(None)
    } else {
        Setting::ToolchainLocation(Some(Utf8PathBuf::from(value)))
    })
}
