//! Launch sequencing: bootstrap, bind, announce readiness, serve.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use javalint_config::Config;

use crate::bootstrap::{ConfigLoader, StaticConfigLoader, bootstrap_with};
use crate::compiler::{JavacResolver, ToolchainResolver};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::transport::{ListenerHandle, LoopExit, SocketListener};

use super::PROCESS_TARGET;
use super::errors::LaunchError;

/// Printed on stdout once the listener is bound.
pub const READY_TOKEN: &str = "RUNNING";

/// Printed on stdout when the configured port is taken.
pub const PORT_USED_TOKEN: &str = "PORT_USED";

/// A bound daemon serving connections on a background thread.
#[derive(Debug)]
pub struct RunningServer {
    address: SocketAddr,
    handle: ListenerHandle,
}

impl RunningServer {
    /// Address the daemon is bound to.
    #[must_use]
    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// Stops the loop after the connection currently being served.
    pub fn shutdown(&self) {
        self.handle.shutdown();
    }

    /// Blocks until the loop stops, either through `KILL` or [`Self::shutdown`].
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Listener`] if the loop thread died.
    pub fn wait(self) -> Result<LoopExit, LaunchError> {
        let exit = self.handle.join()?;
        info!(target: PROCESS_TARGET, ?exit, "connection loop stopped");
        Ok(exit)
    }
}

/// Bootstraps the daemon and starts serving without blocking.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails or the endpoint cannot be bound.
pub fn start_server(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    resolver: Box<dyn ToolchainResolver>,
) -> Result<RunningServer, LaunchError> {
    let daemon = bootstrap_with(loader, Arc::clone(&reporter), resolver)?;
    let config = daemon.config();
    let listener =
        SocketListener::bind(&config.endpoint())?.with_read_timeout(config.read_timeout());
    let address = listener.local_addr();
    info!(
        target: PROCESS_TARGET,
        %address,
        toolchain_ready = daemon.toolchain_ready(),
        "starting connection loop"
    );
    let handle = listener.start(daemon.into_handler())?;
    reporter.listener_ready(address);
    Ok(RunningServer { address, handle })
}

/// Starts the daemon, writes [`READY_TOKEN`] to `announce`, then serves until
/// the loop stops.
///
/// # Errors
///
/// Returns [`LaunchError`] when startup fails or the token cannot be written.
pub fn run_server_with<W: Write>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    resolver: Box<dyn ToolchainResolver>,
    mut announce: W,
) -> Result<LoopExit, LaunchError> {
    let server = start_server(loader, reporter, resolver)?;
    writeln!(announce, "{READY_TOKEN}")
        .and_then(|()| announce.flush())
        .map_err(|source| LaunchError::Announce { source })?;
    server.wait()
}

/// Runs the daemon with the production collaborators, announcing readiness
/// on `announce` (stdout in the binary).
///
/// # Errors
///
/// Returns [`LaunchError`] when startup fails.
pub fn run_server<W: Write>(config: Config, announce: W) -> Result<LoopExit, LaunchError> {
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    let resolver = Box::new(JavacResolver::from_env());
    run_server_with(
        &StaticConfigLoader::new(config),
        reporter,
        resolver,
        announce,
    )
}

/// Writes the launch failure for the editor and the operator, returning the
/// process exit status.
pub fn report_launch_failure<O: Write, E: Write>(
    error: &LaunchError,
    stdout: &mut O,
    stderr: &mut E,
) -> u8 {
    if error.is_port_in_use() {
        let _ = writeln!(stdout, "{PORT_USED_TOKEN}").and_then(|()| stdout.flush());
    }
    let _ = writeln!(stderr, "Error while starting javalintd.\n{error}");
    error.exit_code()
}
