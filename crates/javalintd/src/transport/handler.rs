//! Connection handling abstractions for the daemon listener.

use std::net::{SocketAddr, TcpStream};

/// An accepted client connection.
#[derive(Debug)]
pub struct ConnectionStream {
    stream: TcpStream,
    peer: Option<SocketAddr>,
}

impl ConnectionStream {
    pub(crate) fn new(stream: TcpStream) -> Self {
        let peer = stream.peer_addr().ok();
        Self { stream, peer }
    }

    /// Socket for reading and writing; `&TcpStream` implements both.
    #[must_use]
    pub fn get_ref(&self) -> &TcpStream {
        &self.stream
    }

    /// Remote address, when the OS still reports one.
    #[must_use]
    pub const fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

/// What the listener does after a connection has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Close the connection and accept the next one.
    Continue,
    /// Close the connection and stop accepting.
    Terminate,
}

/// Handles accepted socket connections one at a time.
pub trait ConnectionHandler: Send + 'static {
    /// Handles a single connection. The listener closes it afterwards.
    fn handle(&mut self, stream: ConnectionStream) -> ConnectionOutcome;
}
