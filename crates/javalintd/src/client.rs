//! Blocking client for the daemon's line protocol.
//!
//! Each call opens a fresh connection, writes one framed request, half-closes
//! the socket and reads at most one response line. The `stop` and `lint`
//! subcommands of the binary are thin wrappers around this type.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use camino::Utf8Path;
use thiserror::Error;

use javalint_config::ListenEndpoint;

use crate::diagnostics::wire::{Reply, WireError, parse_reply};
use crate::protocol::{BODY_SENTINEL, FIELD_DELIMITER};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors raised while talking to a daemon.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The endpoint did not resolve to any address.
    #[error("failed to resolve {endpoint}: {source}")]
    Resolve {
        /// Rendered endpoint.
        endpoint: String,
        /// Resolver error.
        #[source]
        source: io::Error,
    },
    /// No daemon accepted the connection.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Rendered endpoint.
        endpoint: String,
        /// Connection error.
        #[source]
        source: io::Error,
    },
    /// Reading or writing the socket failed.
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
    /// A header field would break the line framing.
    #[error("{field} must not contain tabs or line breaks")]
    InvalidField {
        /// Offending field.
        field: &'static str,
    },
    /// A body line equals the end-of-body sentinel.
    #[error("source line {line} is exactly 'END' and cannot be sent")]
    SentinelInBody {
        /// 1-based line number.
        line: usize,
    },
    /// The daemon closed the connection without answering.
    #[error("daemon closed the connection without a response")]
    NoResponse,
    /// The daemon rejected the request.
    #[error("daemon rejected the request ({kind}): {message}")]
    Rejected {
        /// Error kind reported by the daemon.
        kind: String,
        /// Error description reported by the daemon.
        message: String,
    },
    /// The daemon answered a command that expects no answer.
    #[error("unexpected response: {0}")]
    UnexpectedReply(String),
    /// The response line could not be decoded.
    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Client bound to one daemon endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: ListenEndpoint,
    response_timeout: Option<Duration>,
}

impl Client {
    /// Targets `endpoint`.
    #[must_use]
    pub const fn new(endpoint: ListenEndpoint) -> Self {
        Self {
            endpoint,
            response_timeout: Some(RESPONSE_TIMEOUT),
        }
    }

    /// Targets an already resolved address.
    #[must_use]
    pub fn for_address(address: SocketAddr) -> Self {
        Self::new(ListenEndpoint::new(address.ip().to_string(), address.port()))
    }

    /// Overrides how long to wait for a response. `None` waits forever.
    #[must_use]
    pub const fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Lints `body` as `unit` and decodes the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be framed or sent, or
    /// when the reply is missing or malformed.
    pub fn lint(&self, unit: &str, body: &str) -> Result<Reply, ClientError> {
        let line = self.lint_raw(unit, body)?;
        Ok(parse_reply(&line)?)
    }

    /// Lints `body` as `unit` and returns the response line verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request cannot be framed or sent, or
    /// when the daemon closes the connection without answering.
    pub fn lint_raw(&self, unit: &str, body: &str) -> Result<String, ClientError> {
        let request = lint_request(unit, body)?;
        let line = self.exchange(&request)?;
        if line.is_empty() {
            return Err(ClientError::NoResponse);
        }
        Ok(line)
    }

    /// Replaces the daemon's classpath. An empty string clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or is rejected.
    pub fn set_classpath(&self, classpath: &str) -> Result<(), ClientError> {
        self.command(&set_request("CLASSPATH", classpath)?)
    }

    /// Points the daemon at a JDK. `None` returns to environment discovery.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or is rejected.
    pub fn set_jdk(&self, location: Option<&Utf8Path>) -> Result<(), ClientError> {
        self.command(&set_request(
            "JDK",
            location.map_or("", Utf8Path::as_str),
        )?)
    }

    /// Asks the daemon to exit.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when no daemon is reachable.
    pub fn kill(&self) -> Result<(), ClientError> {
        self.command("KILL\n")
    }

    fn command(&self, request: &str) -> Result<(), ClientError> {
        let line = self.exchange(request)?;
        if line.is_empty() {
            return Ok(());
        }
        match parse_reply(&line)? {
            Reply::Rejected(body) => Err(ClientError::Rejected {
                kind: body.kind,
                message: body.message,
            }),
            Reply::Diagnostics(_) => Err(ClientError::UnexpectedReply(line)),
        }
    }

    fn exchange(&self, request: &str) -> Result<String, ClientError> {
        let mut stream = self.connect()?;
        stream.set_read_timeout(self.response_timeout)?;
        stream.write_all(request.as_bytes())?;
        stream.flush()?;
        stream.shutdown(Shutdown::Write)?;
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_owned())
    }

    fn connect(&self) -> Result<TcpStream, ClientError> {
        let endpoint = self.endpoint.to_string();
        let address = (self.endpoint.host(), self.endpoint.port())
            .to_socket_addrs()
            .and_then(|mut addrs| {
                addrs.next().ok_or_else(|| {
                    io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses")
                })
            })
            .map_err(|source| ClientError::Resolve {
                endpoint: endpoint.clone(),
                source,
            })?;
        TcpStream::connect_timeout(&address, CONNECTION_TIMEOUT)
            .map_err(|source| ClientError::Connect { endpoint, source })
    }
}

fn lint_request(unit: &str, body: &str) -> Result<String, ClientError> {
    ensure_single_field("unit", unit)?;
    let mut request = format!("LINT{FIELD_DELIMITER}{unit}\n");
    for (index, line) in body.lines().enumerate() {
        if line == BODY_SENTINEL {
            return Err(ClientError::SentinelInBody { line: index + 1 });
        }
        request.push_str(line);
        request.push('\n');
    }
    request.push_str(BODY_SENTINEL);
    request.push('\n');
    Ok(request)
}

fn set_request(property: &str, value: &str) -> Result<String, ClientError> {
    if value.contains(['\n', '\r']) {
        return Err(ClientError::InvalidField { field: "value" });
    }
    Ok(format!(
        "SET{FIELD_DELIMITER}{property}{FIELD_DELIMITER}{value}\n"
    ))
}

fn ensure_single_field(field: &'static str, value: &str) -> Result<(), ClientError> {
    if value.contains([FIELD_DELIMITER, '\n', '\r']) {
        return Err(ClientError::InvalidField { field });
    }
    Ok(())
}
