//! BDD worlds: one for the bootstrap sequence in isolation and one that runs
//! the daemon on a loopback port and talks to it over TCP.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};
use crate::health::HealthReporter;
use crate::process::{LaunchError, RunningServer, start_server};
use crate::transport::LoopExit;

use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::invoker::{RecordingInvoker, StubResolver};
use super::reporter::RecordingHealthReporter;

/// Scenario world for the bootstrap sequence.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    pub resolver: StubResolver,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    /// Builds a world with a successful loader and a working compiler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            reporter: Arc::new(RecordingHealthReporter::default()),
            resolver: StubResolver::serving(RecordingInvoker::default()),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(TestConfigLoader::new());
        self.reset_results();
    }

    /// Removes every compiler from the resolver.
    pub fn remove_toolchain(&mut self) {
        self.resolver = StubResolver::new();
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        let reporter = Arc::clone(&self.reporter) as Arc<dyn HealthReporter>;
        match bootstrap_with(&*self.loader, reporter, Box::new(self.resolver.clone())) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns the bootstrap error, if any.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns the daemon produced by bootstrap, if any.
    #[must_use]
    pub fn daemon(&self) -> Option<&Daemon> {
        self.daemon.as_ref()
    }

    fn reset_results(&mut self) {
        self.daemon = None;
        self.bootstrap_error = None;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default bootstrap world fixture.
#[must_use]
pub fn world() -> RefCell<TestWorld> {
    RefCell::new(TestWorld::new())
}

/// Scenario world running a daemon on `127.0.0.1`.
pub struct ServerWorld {
    pub reporter: Arc<RecordingHealthReporter>,
    pub invoker: RecordingInvoker,
    pub resolver: StubResolver,
    loader: TestConfigLoader,
    server: Option<RunningServer>,
    launch_error: Option<LaunchError>,
    exit: Option<LoopExit>,
    exchanges: Vec<(String, String)>,
    reserved: Option<TcpListener>,
}

impl ServerWorld {
    /// Builds a world whose resolver always finds the recording compiler.
    #[must_use]
    pub fn new() -> Self {
        let invoker = RecordingInvoker::default();
        Self {
            reporter: Arc::new(RecordingHealthReporter::default()),
            resolver: StubResolver::serving(invoker.clone()),
            invoker,
            loader: TestConfigLoader::new(),
            server: None,
            launch_error: None,
            exit: None,
            exchanges: Vec::new(),
            reserved: None,
        }
    }

    /// Occupies a port and points the daemon at it.
    pub fn reserve_port(&mut self) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
        let port = listener.local_addr().expect("reserved address").port();
        self.loader = self.loader.clone().with_port(port);
        self.reserved = Some(listener);
    }

    /// Starts the daemon, recording any launch failure.
    pub fn start(&mut self) {
        let reporter = Arc::clone(&self.reporter) as Arc<dyn HealthReporter>;
        match start_server(&self.loader, reporter, Box::new(self.resolver.clone())) {
            Ok(server) => self.server = Some(server),
            Err(error) => self.launch_error = Some(error),
        }
    }

    /// Address of the running daemon.
    ///
    /// # Panics
    ///
    /// Panics when the daemon was not started.
    #[must_use]
    pub fn address(&self) -> SocketAddr {
        self.server
            .as_ref()
            .map(RunningServer::address)
            .expect("daemon should be running")
    }

    /// Sends one raw request, half-closes, and records everything returned.
    pub fn send(&mut self, request: &str) {
        let mut stream = TcpStream::connect(self.address()).expect("connect to daemon");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");
        stream.write_all(request.as_bytes()).expect("write request");
        stream.shutdown(Shutdown::Write).expect("half-close");
        let mut response = String::new();
        stream.read_to_string(&mut response).expect("read response");
        self.exchanges.push((request.to_owned(), response));
    }

    /// Waits for the connection loop to stop.
    pub fn wait_for_exit(&mut self) {
        if let Some(server) = self.server.take() {
            self.exit = Some(server.wait().expect("connection loop"));
        }
    }

    /// The most recent raw response, including its newline.
    #[must_use]
    pub fn last_response(&self) -> &str {
        self.exchanges
            .last()
            .map_or("", |(_, response)| response.as_str())
    }

    /// Raw responses to every request whose header starts with `command`.
    #[must_use]
    pub fn responses_to(&self, command: &str) -> Vec<&str> {
        self.exchanges
            .iter()
            .filter(|(request, _)| request.starts_with(command))
            .map(|(_, response)| response.as_str())
            .collect()
    }

    /// Launch failure, if the daemon could not start.
    #[must_use]
    pub fn launch_error(&self) -> Option<&LaunchError> {
        self.launch_error.as_ref()
    }

    /// How the connection loop stopped, once it has.
    #[must_use]
    pub const fn exit(&self) -> Option<LoopExit> {
        self.exit
    }
}

impl Default for ServerWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ServerWorld {
    fn drop(&mut self) {
        if let Some(server) = self.server.take() {
            server.shutdown();
            let _ = server.wait();
        }
        self.reserved = None;
    }
}

/// Default server world fixture.
#[must_use]
pub fn server_world() -> RefCell<ServerWorld> {
    RefCell::new(ServerWorld::new())
}
