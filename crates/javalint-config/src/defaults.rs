//! Built-in defaults shared by the daemon and its client helpers.

use crate::logging::LogFormat;

/// Default TCP port the daemon listens on.
pub const DEFAULT_PORT: u16 = 56789;

/// Default interface the daemon binds. Editors connect over loopback.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default per-connection read timeout in seconds. Zero disables the timeout.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
