//! Test configuration loaders for scenarios covering success and failure paths.

use javalint_config::{Config, ConfigError};

use crate::bootstrap::ConfigLoader;

/// Loader that binds an ephemeral loopback port.
#[derive(Debug, Clone)]
pub struct TestConfigLoader {
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config {
                host: "127.0.0.1".to_owned(),
                port: 0,
                read_timeout_secs: 2,
                ..Config::default()
            },
        }
    }

    /// Binds `port` instead of an ephemeral one.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

/// Loader whose configuration never validates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        let config = Config {
            host: "   ".to_owned(),
            ..Config::default()
        };
        config.validate()?;
        Ok(config)
    }
}
