//! Event-name to handler routing.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::handler::StreamEventHandler;

/// Routes named stream events to the one handler that registered interest.
///
/// Registration normally happens once at startup, before the transport is
/// started. On a name collision the last registration wins.
#[derive(Default)]
pub struct StreamDispatcher {
    inner: Mutex<DispatchTable>,
}

#[derive(Default)]
struct DispatchTable {
    handlers: Vec<Arc<dyn StreamEventHandler>>,
    by_event: HashMap<String, Arc<dyn StreamEventHandler>>,
}

impl StreamDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for all the event names it declares.
    pub fn register(&self, handler: Arc<dyn StreamEventHandler>) {
        let mut inner = self.inner.lock();
        for name in handler.event_names() {
            inner.by_event.insert((*name).to_string(), handler.clone());
        }
        inner.handlers.push(handler);
    }

    /// All event names any registered handler asked for. The transport uses
    /// this set when (re)attaching to the stream.
    pub fn event_names(&self) -> Vec<String> {
        self.inner.lock().by_event.keys().cloned().collect()
    }

    /// Notify every registered handler that the stream is connected.
    pub fn dispatch_connected(&self) {
        for handler in self.handlers() {
            handler.on_connected();
        }
    }

    /// Notify every registered handler that the stream dropped.
    pub fn dispatch_disconnected(&self) {
        for handler in self.handlers() {
            handler.on_disconnected();
        }
    }

    /// Route one event to its handler. Events nobody asked for are logged
    /// and dropped.
    pub fn dispatch_event(&self, event_name: &str, data: &str) {
        let handler = self.inner.lock().by_event.get(event_name).cloned();
        match handler {
            Some(handler) => handler.on_event(event_name, data),
            None => warn!(event = event_name, "dropping event with no registered handler"),
        }
    }

    fn handlers(&self) -> Vec<Arc<dyn StreamEventHandler>> {
        self.inner.lock().handlers.clone()
    }
}
