//! Long-running Java lint daemon.
//!
//! `javalintd` keeps a compiler session warm for editors. Each TCP connection
//! carries exactly one tab-delimited command:
//!
//! - `LINT` compiles one source unit and answers with a single JSON line of
//!   diagnostics;
//! - `SET` replaces the session classpath or JDK location for later requests;
//! - `KILL` stops the connection loop so the process can exit.
//!
//! Connections are served one at a time, so session settings apply in the
//! order clients send them. Lifecycle events flow through a [`HealthReporter`]
//! so operators can see when the toolchain is missing without the daemon
//! refusing to start.
//!
//! The binary prints `RUNNING` on stdout once the listener is bound, or
//! `PORT_USED` (exit status 1) when another process owns the port. Logs only
//! ever go to stderr.

mod bootstrap;
mod cli;
mod client;
pub mod compiler;
pub mod diagnostics;
mod dispatch;
mod health;
mod process;
pub mod protocol;
mod session;
mod telemetry;
mod transport;

pub use bootstrap::{BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, bootstrap_with};
pub use cli::{Cli, CliCommand, run};
pub use client::{Client, ClientError};
pub use dispatch::{
    DispatchConnectionHandler, DispatchError, DispatchOutcome, Dispatcher, ResponseWriter,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{
    LaunchError, PORT_USED_TOKEN, READY_TOKEN, RunningServer, report_launch_failure, run_server,
    run_server_with, start_server,
};
pub use session::SessionConfig;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use transport::{ConnectionOutcome, ListenerError, LoopExit};

#[cfg(test)]
mod tests;
