//! File snapshots as pushed by the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked file, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// No transfer activity known.
    Default,
    /// Queued for download.
    Queued,
    /// Download in progress.
    Downloading,
    /// Download finished.
    Downloaded,
    /// Deleted locally.
    Deleted,
    /// Archive extraction in progress.
    Extracting,
    /// Archive extraction finished.
    Extracted,
    /// Archive extraction failed.
    ExtractFailed,
}

impl FileState {
    /// Parse a wire state string. Matching is case-insensitive and
    /// unrecognized values fall back to [`FileState::Default`] rather than
    /// erroring, so a newer server cannot break an older client.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "DEFAULT" => Self::Default,
            "QUEUED" => Self::Queued,
            "DOWNLOADING" => Self::Downloading,
            "DOWNLOADED" => Self::Downloaded,
            "DELETED" => Self::Deleted,
            "EXTRACTING" => Self::Extracting,
            "EXTRACTED" => Self::Extracted,
            "EXTRACT_FAILED" => Self::ExtractFailed,
            _ => Self::Default,
        }
    }
}

/// Immutable snapshot of one file or directory tracked by the server.
///
/// The name is the stable identity; any change to a file produces a whole
/// new snapshot. Sizes are `None` when the corresponding side has not been
/// scanned yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Unique name within the model; stable identity across updates.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_dir: bool,
    /// Size on the local side in bytes, if known.
    pub local_size: Option<u64>,
    /// Size on the remote side in bytes, if known.
    pub remote_size: Option<u64>,
    /// Lifecycle state.
    pub state: FileState,
    /// Current transfer speed in bytes per second, if transferring.
    pub downloading_speed: Option<u64>,
    /// Estimated seconds until the transfer finishes, if transferring.
    pub eta: Option<u64>,
    /// Full path on the local side.
    pub full_path: String,
    /// Whether the server considers this an extractable archive.
    pub is_extractable: bool,
    /// When the local copy was created.
    pub local_created_timestamp: Option<DateTime<Utc>>,
    /// When the local copy was last modified.
    pub local_modified_timestamp: Option<DateTime<Utc>>,
    /// When the remote copy was created.
    pub remote_created_timestamp: Option<DateTime<Utc>>,
    /// When the remote copy was last modified.
    pub remote_modified_timestamp: Option<DateTime<Utc>>,
    /// Child entries for directories. Part of the wire shape; the flat view
    /// projection does not currently descend into it.
    pub children: Vec<ModelFile>,
}

/// Wire form of [`ModelFile`]: snake_case fields, free-form state string,
/// timestamps in integer seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelFileJson {
    /// File name.
    pub name: String,
    /// Directory flag.
    pub is_dir: bool,
    /// Local size in bytes.
    pub local_size: Option<u64>,
    /// Remote size in bytes.
    pub remote_size: Option<u64>,
    /// State string; decoded case-insensitively.
    pub state: String,
    /// Transfer speed in bytes per second.
    pub downloading_speed: Option<u64>,
    /// Seconds remaining.
    pub eta: Option<u64>,
    /// Full local path.
    pub full_path: String,
    /// Archive flag.
    pub is_extractable: bool,
    /// Local creation time, seconds since the epoch.
    #[serde(default)]
    pub local_created_timestamp: Option<i64>,
    /// Local modification time, seconds since the epoch.
    #[serde(default)]
    pub local_modified_timestamp: Option<i64>,
    /// Remote creation time, seconds since the epoch.
    #[serde(default)]
    pub remote_created_timestamp: Option<i64>,
    /// Remote modification time, seconds since the epoch.
    #[serde(default)]
    pub remote_modified_timestamp: Option<i64>,
    /// Child entries.
    #[serde(default)]
    pub children: Vec<ModelFileJson>,
}

impl ModelFile {
    /// Build a domain snapshot from its wire form. Timestamps arrive in
    /// whole seconds and are widened to millisecond-precision instants.
    pub fn from_wire(json: ModelFileJson) -> Self {
        Self {
            name: json.name,
            is_dir: json.is_dir,
            local_size: json.local_size,
            remote_size: json.remote_size,
            state: FileState::parse(&json.state),
            downloading_speed: json.downloading_speed,
            eta: json.eta,
            full_path: json.full_path,
            is_extractable: json.is_extractable,
            local_created_timestamp: seconds_to_datetime(json.local_created_timestamp),
            local_modified_timestamp: seconds_to_datetime(json.local_modified_timestamp),
            remote_created_timestamp: seconds_to_datetime(json.remote_created_timestamp),
            remote_modified_timestamp: seconds_to_datetime(json.remote_modified_timestamp),
            children: json.children.into_iter().map(ModelFile::from_wire).collect(),
        }
    }
}

fn seconds_to_datetime(seconds: Option<i64>) -> Option<DateTime<Utc>> {
    seconds.and_then(|s| DateTime::from_timestamp(s, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wire(name: &str, state: &str) -> ModelFileJson {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "is_dir": false,
            "local_size": 100,
            "remote_size": 200,
            "state": state,
            "downloading_speed": 50,
            "eta": 2,
            "full_path": format!("/downloads/{name}"),
            "is_extractable": false,
            "local_created_timestamp": 1_500_000_000,
            "local_modified_timestamp": null,
            "remote_created_timestamp": null,
            "remote_modified_timestamp": null,
            "children": []
        }))
        .unwrap()
    }

    #[test]
    fn decodes_state_case_insensitively() {
        assert_eq!(FileState::parse("downloading"), FileState::Downloading);
        assert_eq!(FileState::parse("DOWNLOADING"), FileState::Downloading);
        assert_eq!(FileState::parse("Extract_Failed"), FileState::ExtractFailed);
    }

    #[test]
    fn unknown_state_falls_back_to_default() {
        assert_eq!(FileState::parse("telepathy"), FileState::Default);
        assert_eq!(ModelFile::from_wire(wire("a", "telepathy")).state, FileState::Default);
    }

    #[test]
    fn widens_second_timestamps_to_instants() {
        let file = ModelFile::from_wire(wire("a", "default"));
        assert_eq!(
            file.local_created_timestamp,
            DateTime::from_timestamp(1_500_000_000, 0)
        );
        assert_eq!(file.local_modified_timestamp, None);
    }

    #[test]
    fn decodes_nested_children() {
        let json: ModelFileJson = serde_json::from_value(serde_json::json!({
            "name": "dir",
            "is_dir": true,
            "local_size": null,
            "remote_size": null,
            "state": "default",
            "downloading_speed": null,
            "eta": null,
            "full_path": "/downloads/dir",
            "is_extractable": false,
            "children": [{
                "name": "inner",
                "is_dir": false,
                "local_size": 1,
                "remote_size": 1,
                "state": "downloaded",
                "downloading_speed": null,
                "eta": null,
                "full_path": "/downloads/dir/inner",
                "is_extractable": false,
                "children": []
            }]
        }))
        .unwrap();

        let file = ModelFile::from_wire(json);
        assert_eq!(file.children.len(), 1);
        assert_eq!(file.children[0].name, "inner");
        assert_eq!(file.children[0].state, FileState::Downloaded);
    }
}
