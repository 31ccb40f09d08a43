//! Socket listener for the daemon's TCP endpoint.
//!
//! The transport module binds the configured endpoint and serves accepted
//! connections sequentially on a background thread.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::{ConnectionHandler, ConnectionOutcome, ConnectionStream};
pub use self::listener::{ListenerHandle, LoopExit, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, PanickingHandler, wait_for_count};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
