//! Startup sequence: configuration, telemetry, then the dispatcher.

use std::sync::Arc;

use thiserror::Error;

use javalint_config::{Config, ConfigError};

use crate::compiler::ToolchainResolver;
use crate::dispatch::{DispatchConnectionHandler, Dispatcher};
use crate::health::HealthReporter;
use crate::session::SessionConfig;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Source of the startup [`Config`].
pub trait ConfigLoader: Send + Sync {
    /// Produces a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an empty host or log filter.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Serves a configuration that clap has already parsed.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Reasons the daemon cannot start serving.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration was rejected.
    #[error("invalid configuration: {source}")]
    Configuration {
        /// Validation failure.
        #[source]
        source: ConfigError,
    },
    /// Logging could not be set up.
    #[error("logging setup failed: {source}")]
    Telemetry {
        /// Subscriber failure.
        #[source]
        source: TelemetryError,
    },
}

/// A configured daemon that has not started listening yet.
pub struct Daemon {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Startup configuration after validation.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Proof that logging is installed.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Whether a compiler was resolved during bootstrap.
    #[must_use]
    pub fn toolchain_ready(&self) -> bool {
        self.dispatcher.toolchain_ready()
    }

    /// Hands the dispatcher to the connection loop.
    #[must_use]
    pub fn into_handler(self) -> DispatchConnectionHandler {
        DispatchConnectionHandler::new(self.dispatcher)
    }
}

/// Loads configuration, installs logging and resolves the compiler.
///
/// A missing compiler does not fail startup. It is reported, and `LINT`
/// answers with a synthetic diagnostic until `SET JDK` fixes it.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration or telemetry fails.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    resolver: Box<dyn ToolchainResolver>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    let reported = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader
        .load()
        .map_err(|source| reported(BootstrapError::Configuration { source }))?;
    let telemetry = telemetry::initialise(&config)
        .map_err(|source| reported(BootstrapError::Telemetry { source }))?;

    let dispatcher = Dispatcher::new(
        SessionConfig::from_config(&config),
        resolver,
        Arc::clone(&reporter),
    )
    .with_retain_artifacts(config.retain_artifacts());
    reporter.bootstrap_succeeded(&config);

    Ok(Daemon {
        config,
        dispatcher,
        telemetry,
    })
}
