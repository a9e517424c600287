//! Error types for the stream transport.

/// Failures at the stream transport layer.
///
/// None of these are fatal to the application: the transport reacts by
/// notifying handlers of the disconnect and retrying on its fixed interval.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// HTTP-level failure from the underlying client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure reported by a non-HTTP connector.
    #[error("transport error: {0}")]
    Transport(String),
}
