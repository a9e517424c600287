//! Server and controller health, pushed on the `status` event.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::error;

use driftsync_stream::{StreamEventHandler, Subject};

/// Event carrying a [`ServerStatus`] payload.
pub const EVENT_STATUS: &str = "status";

const EVENT_NAMES: &[&str] = &[EVENT_STATUS];

const WAITING_MESSAGE: &str = "Waiting to connect to the server";
const DISCONNECTED_MESSAGE: &str = "Lost connection to the server";

/// Health of the backend server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Whether the server reports itself healthy.
    pub up: bool,
    /// Message to surface when the server is down.
    pub error_message: Option<String>,
}

/// Scan progress of the sync controller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerStatus {
    /// When the local side was last scanned.
    pub latest_local_scan_time: Option<DateTime<Utc>>,
    /// When the remote side was last scanned.
    pub latest_remote_scan_time: Option<DateTime<Utc>>,
    /// Whether the latest remote scan failed.
    pub latest_remote_scan_failed: bool,
    /// Error from the latest remote scan, if it failed.
    pub latest_remote_scan_error: Option<String>,
}

/// Combined server and controller health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    /// Server process health.
    pub server: ServerInfo,
    /// Controller scan progress.
    pub controller: ControllerStatus,
}

impl ServerStatus {
    /// Status before the first event arrives.
    pub fn waiting() -> Self {
        Self::down(WAITING_MESSAGE)
    }

    /// Status after the stream drops.
    pub fn disconnected() -> Self {
        Self::down(DISCONNECTED_MESSAGE)
    }

    fn down(message: &str) -> Self {
        Self {
            server: ServerInfo {
                up: false,
                error_message: Some(message.to_string()),
            },
            controller: ControllerStatus::default(),
        }
    }
}

#[derive(Deserialize)]
struct ServerInfoJson {
    up: bool,
    error_msg: Option<String>,
}

#[derive(Deserialize)]
struct ControllerStatusJson {
    latest_local_scan_time: Option<i64>,
    latest_remote_scan_time: Option<i64>,
    latest_remote_scan_failed: bool,
    latest_remote_scan_error: Option<String>,
}

#[derive(Deserialize)]
struct ServerStatusJson {
    server: ServerInfoJson,
    controller: ControllerStatusJson,
}

impl From<ServerStatusJson> for ServerStatus {
    fn from(json: ServerStatusJson) -> Self {
        Self {
            server: ServerInfo {
                up: json.server.up,
                error_message: json.server.error_msg,
            },
            controller: ControllerStatus {
                latest_local_scan_time: json
                    .controller
                    .latest_local_scan_time
                    .and_then(|s| DateTime::from_timestamp(s, 0)),
                latest_remote_scan_time: json
                    .controller
                    .latest_remote_scan_time
                    .and_then(|s| DateTime::from_timestamp(s, 0)),
                latest_remote_scan_failed: json.controller.latest_remote_scan_failed,
                latest_remote_scan_error: json.controller.latest_remote_scan_error,
            },
        }
    }
}

/// Store for the latest pushed [`ServerStatus`].
///
/// Starts in the waiting state and flips to a disconnected status whenever
/// the stream drops, so subscribers always have something to show.
pub struct ServerStatusStore {
    status: Subject<ServerStatus>,
}

impl ServerStatusStore {
    pub fn new() -> Self {
        Self {
            status: Subject::new(ServerStatus::waiting()),
        }
    }

    /// Observable status.
    pub fn status(&self) -> &Subject<ServerStatus> {
        &self.status
    }
}

impl Default for ServerStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamEventHandler for ServerStatusStore {
    fn event_names(&self) -> &'static [&'static str] {
        EVENT_NAMES
    }

    fn on_connected(&self) {
        // the server pushes a status right after connecting
    }

    fn on_disconnected(&self) {
        self.status.next(ServerStatus::disconnected());
    }

    fn on_event(&self, event_name: &str, data: &str) {
        match serde_json::from_str::<ServerStatusJson>(data) {
            Ok(json) => self.status.next(json.into()),
            Err(err) => {
                error!(event = event_name, error = %err, "dropping status event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn payload(up: bool) -> String {
        let error_msg = if up {
            serde_json::Value::Null
        } else {
            serde_json::json!("boom")
        };
        serde_json::json!({
            "server": { "up": up, "error_msg": error_msg },
            "controller": {
                "latest_local_scan_time": 1_600_000_000,
                "latest_remote_scan_time": null,
                "latest_remote_scan_failed": false,
                "latest_remote_scan_error": null
            }
        })
        .to_string()
    }

    #[test]
    fn starts_waiting() {
        let store = ServerStatusStore::new();
        let status = store.status().value();
        assert!(!status.server.up);
        assert_eq!(status.server.error_message.as_deref(), Some(WAITING_MESSAGE));
    }

    #[test]
    fn publishes_decoded_status() {
        let store = ServerStatusStore::new();
        store.on_event(EVENT_STATUS, &payload(true));

        let status = store.status().value();
        assert!(status.server.up);
        assert_eq!(status.server.error_message, None);
        assert_eq!(
            status.controller.latest_local_scan_time,
            DateTime::from_timestamp(1_600_000_000, 0)
        );
        assert_eq!(status.controller.latest_remote_scan_time, None);
    }

    #[test]
    fn disconnect_publishes_a_down_status() {
        let store = ServerStatusStore::new();
        store.on_event(EVENT_STATUS, &payload(true));
        store.on_disconnected();

        let status = store.status().value();
        assert!(!status.server.up);
        assert_eq!(
            status.server.error_message.as_deref(),
            Some(DISCONNECTED_MESSAGE)
        );
    }

    #[test]
    fn malformed_status_keeps_the_previous_value() {
        let store = ServerStatusStore::new();
        store.on_event(EVENT_STATUS, &payload(false));
        let before = store.status().value();

        store.on_event(EVENT_STATUS, "not json");
        assert_eq!(store.status().value(), before);
    }
}
