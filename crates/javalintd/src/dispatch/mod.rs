//! Command dispatch for accepted connections.
//!
//! A connection carries one framed request (see [`crate::protocol`]). The
//! [`DispatchConnectionHandler`] reads it, hands the typed command to the
//! [`Dispatcher`], and writes at most one reply line:
//!
//! - `LINT` answers with the diagnostics array.
//! - `SET` and `KILL` answer with nothing.
//! - Framing errors and unknown commands answer with an error object.
//! - Compiler failures are logged and the connection closes without a reply.

mod errors;
mod handler;
mod response;
mod router;

pub use self::errors::DispatchError;
pub use self::handler::DispatchConnectionHandler;
pub use self::response::ResponseWriter;
pub use self::router::{DispatchOutcome, Dispatcher};
