//! Stream transport layer for driftsync
//!
//! Owns the single long-lived server-push connection and fans inbound
//! events out to the stores that registered interest in them:
//! - [`Subject`]: the observable push primitive the stores publish through
//! - [`StreamEventHandler`]: the contract stores implement to receive events
//! - [`StreamDispatcher`]: event-name to handler routing
//! - [`StreamTransport`]: connection lifecycle with fixed-interval reconnect
//! - [`ConnectedStore`]: connection status exposed as an observable

pub mod connected;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod sse;
pub mod subject;
pub mod transport;

pub use connected::ConnectedStore;
pub use dispatch::StreamDispatcher;
pub use error::StreamError;
pub use handler::StreamEventHandler;
pub use sse::{SseEvent, SseParser};
pub use subject::{Subject, Subscription};
pub use transport::{
    ByteStream, HttpStreamConnector, StreamConnector, StreamTransport, STREAM_RETRY_INTERVAL,
};
