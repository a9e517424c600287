//! Error types for the model layer.

/// Protocol inconsistencies in the pushed model stream.
///
/// All of these are non-fatal by design: the offending event is logged and
/// dropped, and the map keeps its previous value. The worst outcome is a
/// stale view until the next init.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Payload was not the JSON shape the event promised.
    #[error("malformed event payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// An added event named a file that already exists.
    #[error("file '{0}' already exists")]
    AlreadyExists(String),

    /// An update or remove event named a file that is not in the map.
    #[error("file '{0}' not found")]
    NotFound(String),

    /// An event name this store never registered for.
    #[error("unrecognized event '{0}'")]
    UnrecognizedEvent(String),
}
