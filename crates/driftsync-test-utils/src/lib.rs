//! Shared test doubles and fixtures for the driftsync crates.
//!
//! Everything here is deterministic and network-free: handlers that record
//! what they saw, a connector that plays back scripted connections, a command
//! backend that answers with a canned reaction, and builders for file
//! fixtures.

use std::collections::VecDeque;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::time::Instant;

use driftsync_model::{CommandBackend, FileCommand, ModelFile, ModelFileJson, Reaction};
use driftsync_stream::{ByteStream, StreamConnector, StreamError, StreamEventHandler};

/// One observation made by a [`RecordingHandler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerEvent {
    /// `on_connected` was called.
    Connected,
    /// `on_disconnected` was called.
    Disconnected,
    /// `on_event` was called with this name and payload.
    Event { name: String, data: String },
}

/// Stream event handler that records every callback in order.
pub struct RecordingHandler {
    names: &'static [&'static str],
    events: Mutex<Vec<HandlerEvent>>,
}

impl RecordingHandler {
    /// Create a handler registered for the given event names.
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Everything observed so far, in callback order.
    pub fn events(&self) -> Vec<HandlerEvent> {
        self.events.lock().clone()
    }
}

impl StreamEventHandler for RecordingHandler {
    fn event_names(&self) -> &'static [&'static str] {
        self.names
    }

    fn on_connected(&self) {
        self.events.lock().push(HandlerEvent::Connected);
    }

    fn on_disconnected(&self) {
        self.events.lock().push(HandlerEvent::Disconnected);
    }

    fn on_event(&self, event_name: &str, data: &str) {
        self.events.lock().push(HandlerEvent::Event {
            name: event_name.to_string(),
            data: data.to_string(),
        });
    }
}

/// What a [`ScriptedConnector`] does on one `connect` call.
pub enum ConnectScript {
    /// Refuse the connection with this message.
    Fail(String),
    /// Accept, deliver these chunks in order, then close the stream.
    Chunks(Vec<Result<Bytes, String>>),
    /// Accept, deliver these chunks in order, then hold the stream open.
    ChunksThenHang(Vec<Result<Bytes, String>>),
    /// Accept and keep the stream open without ever yielding.
    Hang,
}

impl ConnectScript {
    /// A connection that delivers one UTF-8 chunk and closes.
    pub fn one_chunk(text: &str) -> Self {
        Self::Chunks(vec![Ok(Bytes::copy_from_slice(text.as_bytes()))])
    }

    /// A connection that delivers one UTF-8 chunk and stays open.
    pub fn one_chunk_open(text: &str) -> Self {
        Self::ChunksThenHang(vec![Ok(Bytes::copy_from_slice(text.as_bytes()))])
    }
}

/// Connector that plays back a scripted sequence of connections.
///
/// Each `connect` call consumes the next script entry and records the call
/// instant, so reconnect timing can be asserted under paused tokio time.
/// Once the script runs out every further connection hangs.
pub struct ScriptedConnector {
    script: Mutex<VecDeque<ConnectScript>>,
    connect_times: Mutex<Vec<Instant>>,
}

impl ScriptedConnector {
    pub fn new(script: impl IntoIterator<Item = ConnectScript>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            connect_times: Mutex::new(Vec::new()),
        }
    }

    /// Instants at which `connect` was called, in order.
    pub fn connect_times(&self) -> Vec<Instant> {
        self.connect_times.lock().clone()
    }
}

#[async_trait]
impl StreamConnector for ScriptedConnector {
    async fn connect(&self) -> Result<ByteStream, StreamError> {
        self.connect_times.lock().push(Instant::now());
        let next = self.script.lock().pop_front();
        match next {
            Some(ConnectScript::Fail(message)) => Err(StreamError::Transport(message)),
            Some(ConnectScript::Chunks(chunks)) => Ok(scripted_stream(chunks).boxed()),
            Some(ConnectScript::ChunksThenHang(chunks)) => {
                Ok(scripted_stream(chunks).chain(stream::pending()).boxed())
            }
            Some(ConnectScript::Hang) | None => Ok(stream::pending().boxed()),
        }
    }
}

fn scripted_stream(
    chunks: Vec<Result<Bytes, String>>,
) -> impl futures::Stream<Item = Result<Bytes, StreamError>> {
    stream::iter(
        chunks
            .into_iter()
            .map(|chunk| chunk.map_err(StreamError::Transport)),
    )
}

/// Command backend that records every call and answers with a canned
/// reaction (success with an empty body unless one is set).
#[derive(Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<(FileCommand, String)>>,
    reaction: Mutex<Option<Reaction>>,
}

impl RecordingBackend {
    /// Make every subsequent call answer with this reaction.
    pub fn respond_with(&self, reaction: Reaction) {
        *self.reaction.lock() = Some(reaction);
    }

    /// Every `(command, file_name)` pair run so far, in order.
    pub fn calls(&self) -> Vec<(FileCommand, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl CommandBackend for RecordingBackend {
    async fn run(&self, command: FileCommand, file_name: &str) -> Reaction {
        self.calls.lock().push((command, file_name.to_string()));
        self.reaction
            .lock()
            .clone()
            .unwrap_or_else(|| Reaction::ok(""))
    }
}

/// Wire-shaped JSON for one file, with test-friendly defaults. Tests mutate
/// individual fields before decoding.
pub fn model_file_json(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "is_dir": false,
        "local_size": 100,
        "remote_size": 200,
        "state": "default",
        "downloading_speed": null,
        "eta": null,
        "full_path": format!("/downloads/{name}"),
        "is_extractable": false,
        "local_created_timestamp": null,
        "local_modified_timestamp": null,
        "remote_created_timestamp": null,
        "remote_modified_timestamp": null,
        "children": []
    })
}

/// Decoded [`ModelFile`] fixture built from [`model_file_json`].
pub fn model_file(name: &str) -> ModelFile {
    let json: ModelFileJson = serde_json::from_value(model_file_json(name))
        .unwrap_or_else(|err| panic!("fixture for '{name}' failed to decode: {err}"));
    ModelFile::from_wire(json)
}

/// Install a test tracing subscriber once per process. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}
