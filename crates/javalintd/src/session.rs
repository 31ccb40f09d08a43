//! Mutable state shared by every connection for the life of the process.

use camino::{Utf8Path, Utf8PathBuf};
use javalint_config::Config;

/// Classpath and toolchain location set by `SET` commands.
///
/// Only the sequential connection loop touches this value, so it is owned by
/// the dispatcher rather than wrapped in a lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfig {
    classpath: String,
    toolchain_location: Option<Utf8PathBuf>,
}

impl SessionConfig {
    /// Seeds the session from startup configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            classpath: config.classpath().to_owned(),
            toolchain_location: config.jdk_home().map(Utf8Path::to_owned),
        }
    }

    /// Classpath handed to the next compilation.
    #[must_use]
    pub fn classpath(&self) -> &str {
        &self.classpath
    }

    /// JDK used to resolve the compiler, if one was set.
    #[must_use]
    pub fn toolchain_location(&self) -> Option<&Utf8Path> {
        self.toolchain_location.as_deref()
    }

    /// Replaces the classpath verbatim.
    pub fn set_classpath(&mut self, classpath: impl Into<String>) {
        self.classpath = classpath.into();
    }

    /// Replaces the toolchain location. `None` falls back to the environment.
    pub fn set_toolchain_location(&mut self, location: Option<Utf8PathBuf>) {
        self.toolchain_location = location;
    }
}
