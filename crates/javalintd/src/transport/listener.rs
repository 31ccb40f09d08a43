//! Sequential TCP listener.
//!
//! The accept loop serves one connection to completion before accepting the
//! next, so handlers never run concurrently and may hold mutable state.

use std::any::Any;
use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use javalint_config::ListenEndpoint;
use tracing::{debug, error, info, warn};

use super::{ConnectionHandler, ConnectionOutcome, ConnectionStream, LISTENER_TARGET, ListenerError};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);
const THREAD_NAME: &str = "javalintd-listener";

/// Listener bound to a TCP endpoint.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: ListenEndpoint,
    listener: TcpListener,
    local_addr: SocketAddr,
    read_timeout: Option<Duration>,
}

impl SocketListener {
    /// Binds `endpoint`. Port zero picks an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::AddressInUse`] when the port is taken and
    /// other variants for resolution or bind failures.
    pub fn bind(endpoint: &ListenEndpoint) -> Result<Self, ListenerError> {
        let listener = bind_tcp(endpoint.host(), endpoint.port())?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { source })?;
        Ok(Self {
            endpoint: endpoint.clone(),
            listener,
            local_addr,
            read_timeout: None,
        })
    }

    /// Applies `timeout` to reads on every accepted connection.
    #[must_use]
    pub const fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Address the listener is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Starts the accept loop on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the socket cannot be made non-blocking
    /// or the thread cannot be spawned.
    pub fn start<H>(self, mut handler: H) -> Result<ListenerHandle, ListenerError>
    where
        H: ConnectionHandler,
    {
        self.listener
            .set_nonblocking(true)
            .map_err(|source| ListenerError::NonBlocking { source })?;
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || run_accept_loop(&self, &shutdown_flag, &mut handler))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            shutdown,
            handle: Some(handle),
        })
    }
}

/// Why the accept loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// [`ListenerHandle::shutdown`] was called.
    Shutdown,
    /// A handler asked the daemon to stop.
    Killed,
}

/// Handle to the background listener thread.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<LoopExit>>,
}

impl ListenerHandle {
    /// Asks the loop to stop after the current connection.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Waits for the loop to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the loop thread panicked.
    pub fn join(mut self) -> Result<LoopExit, ListenerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ListenerError::ThreadPanic),
            None => Ok(LoopExit::Shutdown),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}

fn run_accept_loop<H>(listener: &SocketListener, shutdown: &AtomicBool, handler: &mut H) -> LoopExit
where
    H: ConnectionHandler,
{
    info!(
        target: LISTENER_TARGET,
        endpoint = %listener.endpoint,
        address = %listener.local_addr,
        "socket listener active"
    );
    let mut last_error = None::<io::ErrorKind>;
    while !shutdown.load(Ordering::SeqCst) {
        match accept_connection(listener) {
            Ok(Some(stream)) => {
                last_error = None;
                if serve_connection(handler, stream) == ConnectionOutcome::Terminate {
                    info!(target: LISTENER_TARGET, "socket listener stopping on request");
                    return LoopExit::Killed;
                }
            }
            Ok(None) => {
                thread::sleep(ACCEPT_BACKOFF);
            }
            Err(error) => {
                let kind = error.kind();
                if last_error != Some(kind) {
                    warn!(
                        target: LISTENER_TARGET,
                        error = %error,
                        "socket accept error"
                    );
                }
                last_error = Some(kind);
                thread::sleep(ERROR_BACKOFF);
            }
        }
    }
    debug!(target: LISTENER_TARGET, "socket listener shut down");
    LoopExit::Shutdown
}

fn serve_connection<H>(handler: &mut H, stream: ConnectionStream) -> ConnectionOutcome
where
    H: ConnectionHandler,
{
    let peer = stream.peer();
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(stream))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            error!(
                target: LISTENER_TARGET,
                peer = ?peer,
                panic = %panic_message(payload.as_ref()),
                "connection handler panicked"
            );
            ConnectionOutcome::Continue
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

fn accept_connection(listener: &SocketListener) -> Result<Option<ConnectionStream>, io::Error> {
    match listener.listener.accept() {
        Ok((stream, _)) => {
            stream.set_nonblocking(false)?;
            stream.set_read_timeout(listener.read_timeout)?;
            Ok(Some(ConnectionStream::new(stream)))
        }
        Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
        Err(error) => Err(error),
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?;
    let addr = addrs.next().ok_or_else(|| ListenerError::ResolveEmpty {
        host: host.to_owned(),
        port,
    })?;
    TcpListener::bind(addr).map_err(|source| {
        if source.kind() == io::ErrorKind::AddrInUse {
            ListenerError::AddressInUse { addr, source }
        } else {
            ListenerError::BindTcp { addr, source }
        }
    })
}
