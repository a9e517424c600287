//! Server command client.
//!
//! Remote actions are keyed by file name and travel as a path segment of a
//! fixed URL template. The backend decodes the segment once itself, so the
//! name is percent-encoded twice before it goes on the wire.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::debug;

/// Characters escaped by component encoding: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Component-encode a file name twice for use as a command path segment.
pub(crate) fn double_encode(name: &str) -> String {
    let once = utf8_percent_encode(name, COMPONENT).to_string();
    utf8_percent_encode(&once, COMPONENT).to_string()
}

/// Result of a remote action. Transport failures are folded into a failed
/// reaction; callers never see an `Err` or a panic from an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Whether the server accepted the action.
    pub success: bool,
    /// Opaque response body on success.
    pub data: Option<String>,
    /// Human-readable message on failure.
    pub error_message: Option<String>,
}

impl Reaction {
    /// A successful reaction carrying the server's response body.
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error_message: None,
        }
    }

    /// A failed reaction carrying an error message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error_message: Some(message.into()),
        }
    }
}

/// Remote actions the server understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCommand {
    /// Queue a file for download.
    Queue,
    /// Stop a queued or downloading file.
    Stop,
    /// Extract a downloaded archive.
    Extract,
    /// Delete the local copy.
    DeleteLocal,
    /// Delete the remote copy.
    DeleteRemote,
}

impl FileCommand {
    /// Path segment of this command in the URL template.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::Stop => "stop",
            Self::Extract => "extract",
            Self::DeleteLocal => "delete_local",
            Self::DeleteRemote => "delete_remote",
        }
    }
}

/// Seam between the model store and the HTTP client, so actions are
/// testable without a server.
#[async_trait]
pub trait CommandBackend: Send + Sync {
    /// Run one command against the given file name (raw, unencoded).
    async fn run(&self, command: FileCommand, file_name: &str) -> Reaction;
}

/// Issues commands against the backend's REST API.
pub struct CommandClient {
    client: reqwest::Client,
    base_url: String,
}

impl CommandClient {
    /// Create a client for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn command_url(&self, command: FileCommand, file_name: &str) -> String {
        format!(
            "{}/server/command/{}/{}",
            self.base_url.trim_end_matches('/'),
            command.verb(),
            double_encode(file_name)
        )
    }
}

#[async_trait]
impl CommandBackend for CommandClient {
    async fn run(&self, command: FileCommand, file_name: &str) -> Reaction {
        let url = self.command_url(command, file_name);
        debug!(%url, "sending server command");
        match self.client.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if status.is_success() {
                    debug!(%url, response = %body, "command succeeded");
                    Reaction::ok(body)
                } else if body.is_empty() {
                    Reaction::failed(status.to_string())
                } else {
                    Reaction::failed(body)
                }
            }
            Err(err) => Reaction::failed(err.to_string()),
        }
    }
}
