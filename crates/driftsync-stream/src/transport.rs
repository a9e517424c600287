//! Connection lifecycle for the server-push stream.
//!
//! The transport owns exactly one connection at a time. On any failure it
//! tears the connection down, notifies every registered handler once, waits
//! the fixed retry interval and reconnects from scratch. There is no maximum
//! retry count and no backoff growth; a disconnected client keeps knocking
//! every three seconds until the server answers.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};

use crate::dispatch::StreamDispatcher;
use crate::error::StreamError;
use crate::sse::SseParser;

/// Fixed delay between reconnection attempts.
pub const STREAM_RETRY_INTERVAL: Duration = Duration::from_millis(3000);

/// Raw byte chunks from an open stream connection.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// Seam between the reconnect loop and the actual connection mechanism.
///
/// Production uses [`HttpStreamConnector`]; tests script connections and
/// failures without a network.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    /// Open a fresh connection and return its byte stream.
    async fn connect(&self) -> Result<ByteStream, StreamError>;
}

/// Connects to the server's SSE endpoint over HTTP.
pub struct HttpStreamConnector {
    client: reqwest::Client,
    url: String,
}

impl HttpStreamConnector {
    /// Create a connector for the given stream URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl StreamConnector for HttpStreamConnector {
    async fn connect(&self) -> Result<ByteStream, StreamError> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes_stream().map_err(StreamError::from).boxed())
    }
}

/// Drives the connect / pump / notify / retry loop.
pub struct StreamTransport {
    connector: Arc<dyn StreamConnector>,
    dispatcher: Arc<StreamDispatcher>,
    retry_interval: Duration,
}

impl StreamTransport {
    /// Create a transport with the default retry interval.
    pub fn new(connector: Arc<dyn StreamConnector>, dispatcher: Arc<StreamDispatcher>) -> Self {
        Self {
            connector,
            dispatcher,
            retry_interval: STREAM_RETRY_INTERVAL,
        }
    }

    /// Override the retry interval. Handlers should be registered on the
    /// dispatcher before the transport starts.
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Spawn the connection loop on the current tokio runtime. The loop runs
    /// until the returned handle is aborted.
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        loop {
            match self.connector.connect().await {
                Ok(stream) => {
                    info!("connected to server stream");
                    self.dispatcher.dispatch_connected();
                    self.pump(stream).await;
                    self.dispatcher.dispatch_disconnected();
                }
                Err(err) => {
                    warn!(error = %err, "stream connection failed");
                    self.dispatcher.dispatch_disconnected();
                }
            }
            tokio::time::sleep(self.retry_interval).await;
        }
    }

    /// Read the stream to its end, routing each completed event. Returns
    /// when the stream errors or closes.
    async fn pump(&self, mut stream: ByteStream) {
        let mut parser = SseParser::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for event in parser.feed(&bytes) {
                        debug!(event = %event.name, "dispatching stream event");
                        self.dispatcher.dispatch_event(&event.name, &event.data);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "error in stream");
                    return;
                }
            }
        }
        info!("server stream closed");
    }
}
