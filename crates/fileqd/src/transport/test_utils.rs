//! Test helpers for the transport module.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use super::{ConnectionHandler, ConnectionStream};

/// Counts connections and keeps them open until the test drops the handler.
pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
    held: Mutex<Vec<ConnectionStream>>,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
            held: Mutex::new(Vec::new()),
        });
        (count, handler)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, stream: ConnectionStream) {
        if let Ok(mut held) = self.held.lock() {
            held.push(stream);
        }
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
