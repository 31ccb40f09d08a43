//! Shared configuration for the javalint daemon and its client helpers.
//!
//! Every setting can be supplied as a command-line flag or through a
//! `JAVALINT_*` environment variable; flags win over the environment and the
//! environment wins over the built-in defaults in [`defaults`]. The daemon
//! flattens [`Config`] into its own command-line parser so both binaries agree
//! on flag names.
//!
//! `classpath` and `jdk_home` only seed the session configuration at startup.
//! Connected clients replace them afterwards with `SET` commands.

pub mod defaults;
mod endpoint;
mod logging;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use thiserror::Error;

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, DEFAULT_READ_TIMEOUT_SECS, default_log_filter,
    default_log_format,
};
pub use endpoint::ListenEndpoint;
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Config {
    /// Interface the daemon binds.
    #[arg(long, env = "JAVALINT_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// TCP port the daemon listens on.
    #[arg(long, env = "JAVALINT_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Tracing filter expression (for example `info,javalintd=debug`).
    #[arg(long, env = "JAVALINT_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
    /// Log output format (`json` or `compact`).
    #[arg(long, env = "JAVALINT_LOG_FORMAT", default_value_t = LogFormat::Json)]
    pub log_format: LogFormat,
    /// Initial classpath handed to the compiler.
    #[arg(long, env = "JAVALINT_CLASSPATH", default_value = "")]
    pub classpath: String,
    /// Initial JDK installation used to resolve `javac`.
    #[arg(long, env = "JAVALINT_JDK_HOME")]
    pub jdk_home: Option<Utf8PathBuf>,
    /// Seconds a client may stay silent mid-request. Zero waits forever.
    #[arg(long, env = "JAVALINT_READ_TIMEOUT_SECS", default_value_t = DEFAULT_READ_TIMEOUT_SECS)]
    pub read_timeout_secs: u64,
    /// Keep compiler scratch directories instead of deleting them.
    #[arg(long, env = "JAVALINT_RETAIN_ARTIFACTS")]
    pub retain_artifacts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: default_log_format(),
            classpath: String::new(),
            jdk_home: None,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            retain_artifacts: false,
        }
    }
}

impl Config {
    /// Returns a copy listening on `port` instead.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Endpoint the daemon binds.
    #[must_use]
    pub fn endpoint(&self) -> ListenEndpoint {
        ListenEndpoint::new(self.host.clone(), self.port)
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Classpath the first session starts with.
    #[must_use]
    pub fn classpath(&self) -> &str {
        &self.classpath
    }

    /// JDK location the first session starts with.
    #[must_use]
    pub fn jdk_home(&self) -> Option<&Utf8Path> {
        self.jdk_home.as_deref()
    }

    /// Read timeout applied to each accepted connection.
    #[must_use]
    pub const fn read_timeout(&self) -> Option<Duration> {
        if self.read_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.read_timeout_secs))
        }
    }

    /// Whether compiler scratch directories are kept.
    #[must_use]
    pub const fn retain_artifacts(&self) -> bool {
        self.retain_artifacts
    }

    /// Rejects values that cannot produce a working daemon.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the host or log filter is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::EmptyLogFilter);
        }
        Ok(())
    }
}

/// Configuration values rejected by [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The bind host was blank.
    #[error("listen host must not be empty")]
    EmptyHost,
    /// The log filter was blank.
    #[error("log filter must not be empty")]
    EmptyLogFilter,
}
