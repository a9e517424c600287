//! Connection status as an observable.

use crate::handler::StreamEventHandler;
use crate::subject::Subject;

/// Exposes whether the server stream is currently connected.
///
/// Registers for no events; it only cares about the connect/disconnect
/// callbacks, and publishes only on actual transitions.
pub struct ConnectedStore {
    connected: Subject<bool>,
}

impl ConnectedStore {
    /// Create a store reporting disconnected.
    pub fn new() -> Self {
        Self {
            connected: Subject::new(false),
        }
    }

    /// Observable connection status.
    pub fn connected(&self) -> &Subject<bool> {
        &self.connected
    }

    /// Current connection status.
    pub fn is_connected(&self) -> bool {
        self.connected.value()
    }
}

impl Default for ConnectedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamEventHandler for ConnectedStore {
    fn event_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn on_connected(&self) {
        if !self.connected.value() {
            self.connected.next(true);
        }
    }

    fn on_disconnected(&self) {
        if self.connected.value() {
            self.connected.next(false);
        }
    }

    fn on_event(&self, _event_name: &str, _data: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn starts_disconnected() {
        let store = ConnectedStore::new();
        assert!(!store.is_connected());
    }

    #[test]
    fn publishes_only_on_transitions() {
        let store = ConnectedStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        store.connected().subscribe(move |v| seen_clone.lock().push(*v));

        store.on_connected();
        store.on_connected();
        store.on_disconnected();
        store.on_disconnected();

        assert_eq!(*seen.lock(), vec![false, true, false]);
    }
}
