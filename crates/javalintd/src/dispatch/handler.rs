//! Connection handler that frames, dispatches, and answers one request.

use std::io::{BufRead, BufReader, Write};

use tracing::{debug, warn};

use crate::protocol::RequestReader;
use crate::transport::{ConnectionHandler, ConnectionOutcome, ConnectionStream};

use super::errors::DispatchError;
use super::response::ResponseWriter;
use super::router::{DISPATCH_TARGET, DispatchOutcome, Dispatcher};

/// Connection handler that serves one command per connection.
///
/// The dispatcher, and with it the session configuration, lives as long as
/// the handler, so settings made on one connection apply to the next.
#[derive(Debug)]
pub struct DispatchConnectionHandler {
    dispatcher: Dispatcher,
}

impl DispatchConnectionHandler {
    /// Creates a handler around `dispatcher`.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Serves one request read from `reader`, replying on `writer`.
    pub fn serve<R: BufRead, W: Write>(&mut self, reader: R, writer: W) -> ConnectionOutcome {
        let mut requests = RequestReader::new(reader);
        let mut responses = ResponseWriter::new(writer);

        let result = match requests.read_command() {
            Ok(Some(command)) => self.dispatcher.dispatch(command, &mut responses),
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return ConnectionOutcome::Continue;
            }
            Err(error) => Err(DispatchError::from(error)),
        };

        match result {
            Ok(DispatchOutcome::Continue) => ConnectionOutcome::Continue,
            Ok(DispatchOutcome::Terminate) => ConnectionOutcome::Terminate,
            Err(error) => {
                self.report(&error, &mut responses);
                ConnectionOutcome::Continue
            }
        }
    }

    fn report<W: Write>(&self, error: &DispatchError, responses: &mut ResponseWriter<W>) {
        if !error.is_reportable() {
            self.dispatcher.reporter().connection_failed(error);
            return;
        }
        warn!(
            target: DISPATCH_TARGET,
            kind = error.kind(),
            error = %error,
            "rejected request"
        );
        if let Err(write_error) = responses.write_error(error) {
            warn!(
                target: DISPATCH_TARGET,
                error = %write_error,
                "failed to write error response"
            );
        }
    }
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&mut self, stream: ConnectionStream) -> ConnectionOutcome {
        let socket = stream.get_ref();
        self.serve(BufReader::new(socket), socket)
    }
}
