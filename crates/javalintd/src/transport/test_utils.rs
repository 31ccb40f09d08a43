//! Test helpers for the transport module.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::{Duration, Instant};

use super::{ConnectionHandler, ConnectionOutcome, ConnectionStream};

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
    terminate_after: Option<usize>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Self) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Self {
            count: Arc::clone(&count),
            terminate_after: None,
        };
        (count, handler)
    }

    /// Asks the listener to stop once `connections` have been handled.
    pub(crate) fn terminating_after(connections: usize) -> (Arc<AtomicUsize>, Self) {
        let (count, mut handler) = Self::new();
        handler.terminate_after = Some(connections);
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&mut self, _stream: ConnectionStream) -> ConnectionOutcome {
        let seen = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        match self.terminate_after {
            Some(limit) if seen >= limit => ConnectionOutcome::Terminate,
            _ => ConnectionOutcome::Continue,
        }
    }
}

/// Panics on the first connection and counts the rest.
pub(crate) struct PanickingHandler {
    count: Arc<AtomicUsize>,
    panicked: bool,
}

impl PanickingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Self) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Self {
            count: Arc::clone(&count),
            panicked: false,
        };
        (count, handler)
    }
}

impl ConnectionHandler for PanickingHandler {
    fn handle(&mut self, _stream: ConnectionStream) -> ConnectionOutcome {
        if !self.panicked {
            self.panicked = true;
            panic!("handler failure injected by test");
        }
        self.count.fetch_add(1, Ordering::SeqCst);
        ConnectionOutcome::Continue
    }
}

pub(crate) fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}
