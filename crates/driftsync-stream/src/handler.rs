//! Contract between the stream transport and the stores that consume it.

/// Implemented by stores that want events from the server-push stream.
///
/// All callbacks run on the transport's task, synchronously and in
/// registration order. Implementations apply their state change and publish
/// through a [`crate::Subject`] before returning; they must not block.
pub trait StreamEventHandler: Send + Sync {
    /// Event names this handler wants routed to it.
    fn event_names(&self) -> &'static [&'static str];

    /// The stream connection is open. A fresh init event is expected to
    /// follow from the server, so most handlers do nothing here.
    fn on_connected(&self);

    /// The stream connection dropped. Handlers discard state the server is
    /// authoritative for.
    fn on_disconnected(&self);

    /// A subscribed event arrived with its raw payload.
    fn on_event(&self, event_name: &str, data: &str);
}
