//! Authoritative file map, kept in sync by stream events.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, error};

use driftsync_stream::{StreamEventHandler, Subject};

use crate::command::{CommandBackend, FileCommand, Reaction};
use crate::error::ModelError;
use crate::file::{ModelFile, ModelFileJson};

/// Name → snapshot map. `im::HashMap` gives cheap whole-map snapshots, so
/// every publish hands subscribers an immutable value.
pub type FileMap = im::HashMap<String, ModelFile>;

/// Init event: full replacement of the model.
pub const EVENT_INIT: &str = "model-init";
/// Added event: one new file.
pub const EVENT_ADDED: &str = "model-added";
/// Updated event: replacement snapshot for one file.
pub const EVENT_UPDATED: &str = "model-updated";
/// Removed event: one file gone.
pub const EVENT_REMOVED: &str = "model-removed";

const EVENT_NAMES: &[&str] = &[EVENT_INIT, EVENT_ADDED, EVENT_UPDATED, EVENT_REMOVED];

#[derive(Deserialize)]
struct NewFileEvent {
    new_file: ModelFileJson,
}

#[derive(Deserialize)]
struct OldFileEvent {
    old_file: ModelFileJson,
}

/// Store for the server-authoritative file model.
///
/// Applies init/added/updated/removed events from the stream and publishes
/// the whole map after every accepted mutation. Protocol inconsistencies
/// (duplicate adds, updates or removes of unknown names, malformed payloads)
/// are logged and dropped without touching the map. A disconnect clears the
/// map entirely; the server re-inits on reconnect.
pub struct ModelFileStore {
    files: Subject<FileMap>,
    backend: Arc<dyn CommandBackend>,
}

impl ModelFileStore {
    /// Create a store that issues remote actions through the given backend.
    pub fn new(backend: Arc<dyn CommandBackend>) -> Self {
        Self {
            files: Subject::new(FileMap::new()),
            backend,
        }
    }

    /// Observable file map.
    pub fn files(&self) -> &Subject<FileMap> {
        &self.files
    }

    /// Snapshot of the current map.
    pub fn snapshot(&self) -> FileMap {
        self.files.value()
    }

    /// Queue a file for download.
    pub async fn queue(&self, file_name: &str) -> Reaction {
        debug!(file = file_name, "queue model file");
        self.backend.run(FileCommand::Queue, file_name).await
    }

    /// Stop a queued or downloading file.
    pub async fn stop(&self, file_name: &str) -> Reaction {
        debug!(file = file_name, "stop model file");
        self.backend.run(FileCommand::Stop, file_name).await
    }

    /// Extract a downloaded archive.
    pub async fn extract(&self, file_name: &str) -> Reaction {
        debug!(file = file_name, "extract model file");
        self.backend.run(FileCommand::Extract, file_name).await
    }

    /// Delete the local copy of a file.
    pub async fn delete_local(&self, file_name: &str) -> Reaction {
        debug!(file = file_name, "locally delete model file");
        self.backend.run(FileCommand::DeleteLocal, file_name).await
    }

    /// Delete the remote copy of a file.
    pub async fn delete_remote(&self, file_name: &str) -> Reaction {
        debug!(file = file_name, "remotely delete model file");
        self.backend.run(FileCommand::DeleteRemote, file_name).await
    }

    fn apply_event(&self, event_name: &str, data: &str) -> Result<(), ModelError> {
        match event_name {
            EVENT_INIT => {
                let parsed: Vec<ModelFileJson> = serde_json::from_str(data)?;
                // Build in wire order; a duplicate name silently keeps the
                // last occurrence.
                let mut map = FileMap::new();
                for json in parsed {
                    let file = ModelFile::from_wire(json);
                    map.insert(file.name.clone(), file);
                }
                debug!(count = map.len(), "model initialized");
                self.files.next(map);
                Ok(())
            }
            EVENT_ADDED => {
                let parsed: NewFileEvent = serde_json::from_str(data)?;
                let file = ModelFile::from_wire(parsed.new_file);
                let mut map = self.files.value();
                if map.contains_key(&file.name) {
                    return Err(ModelError::AlreadyExists(file.name));
                }
                debug!(file = %file.name, "added file");
                map.insert(file.name.clone(), file);
                self.files.next(map);
                Ok(())
            }
            EVENT_UPDATED => {
                let parsed: NewFileEvent = serde_json::from_str(data)?;
                let file = ModelFile::from_wire(parsed.new_file);
                let mut map = self.files.value();
                if !map.contains_key(&file.name) {
                    return Err(ModelError::NotFound(file.name));
                }
                debug!(file = %file.name, "updated file");
                map.insert(file.name.clone(), file);
                self.files.next(map);
                Ok(())
            }
            EVENT_REMOVED => {
                let parsed: OldFileEvent = serde_json::from_str(data)?;
                let file = ModelFile::from_wire(parsed.old_file);
                let mut map = self.files.value();
                if map.remove(&file.name).is_none() {
                    return Err(ModelError::NotFound(file.name));
                }
                debug!(file = %file.name, "removed file");
                self.files.next(map);
                Ok(())
            }
            other => Err(ModelError::UnrecognizedEvent(other.to_string())),
        }
    }
}

impl StreamEventHandler for ModelFileStore {
    fn event_names(&self) -> &'static [&'static str] {
        EVENT_NAMES
    }

    fn on_connected(&self) {
        // nothing to do; the server sends a fresh init
    }

    fn on_disconnected(&self) {
        self.files.next(FileMap::new());
    }

    fn on_event(&self, event_name: &str, data: &str) {
        if let Err(err) = self.apply_event(event_name, data) {
            error!(event = event_name, error = %err, "dropping model event");
        }
    }
}
