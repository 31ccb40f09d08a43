//! Test doubles and scenario worlds shared by the daemon test suites.

mod config_loader;
mod invoker;
mod reporter;
mod world;

pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use invoker::{RecordingInvoker, StubResolver};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{ServerWorld, TestWorld, server_world, world};
