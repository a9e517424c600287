//! The view projection engine.
//!
//! Subscribes to the model file map, diffs each snapshot against the
//! previous one, and maintains an ordered list of view files plus a
//! name → index cache. Publishes two lists on every change: the full
//! ordered list and the same list passed through the active filter.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error};

use driftsync_model::{FileCommand, FileMap, ModelFile, ModelFileStore, Reaction};
use driftsync_stream::Subject;

use crate::file::ViewFile;
use crate::filter::ViewFileFilterCriteria;
use crate::sort::ViewFileComparator;

/// Published list snapshot. Shared immutably so every subscriber reads the
/// same value without copying.
pub type ViewFileList = Arc<Vec<ViewFile>>;

#[derive(Default)]
struct EngineState {
    files: Vec<ViewFile>,
    indices: HashMap<String, usize>,
    prev_model: FileMap,
    filter: Option<Arc<dyn ViewFileFilterCriteria>>,
    comparator: Option<ViewFileComparator>,
}

impl EngineState {
    fn rebuild_indices(&mut self) {
        self.indices.clear();
        for (index, file) in self.files.iter().enumerate() {
            self.indices.insert(file.name.clone(), index);
        }
    }

    fn lists(&self) -> (ViewFileList, ViewFileList) {
        let full: ViewFileList = Arc::new(self.files.clone());
        let filtered = match &self.filter {
            None => full.clone(),
            Some(filter) => Arc::new(
                self.files
                    .iter()
                    .filter(|file| filter.matches(file))
                    .cloned()
                    .collect(),
            ),
        };
        (full, filtered)
    }
}

/// Owns the view file list derived from the model map.
pub struct ViewFileService {
    model: Arc<ModelFileStore>,
    state: Mutex<EngineState>,
    files: Subject<ViewFileList>,
    filtered_files: Subject<ViewFileList>,
}

// Fields that make a re-projection worthwhile. Name is the map key, so a
// name change shows up as a remove plus an add.
fn model_changed(a: &ModelFile, b: &ModelFile) -> bool {
    a.state != b.state
        || a.local_size != b.local_size
        || a.remote_size != b.remote_size
        || a.downloading_speed != b.downloading_speed
        || a.eta != b.eta
        || a.full_path != b.full_path
        || a.is_extractable != b.is_extractable
        || a.is_dir != b.is_dir
}

impl ViewFileService {
    /// Create the engine and subscribe it to the model map. The current
    /// snapshot is applied immediately.
    pub fn attach(model: Arc<ModelFileStore>) -> Arc<Self> {
        let service = Arc::new(Self {
            model,
            state: Mutex::new(EngineState::default()),
            files: Subject::new(Arc::new(Vec::new())),
            filtered_files: Subject::new(Arc::new(Vec::new())),
        });
        let weak = Arc::downgrade(&service);
        service.model.files().subscribe(move |map| {
            if let Some(service) = weak.upgrade() {
                service.apply_model(map.clone());
            }
        });
        service
    }

    /// Observable full ordered list.
    pub fn files(&self) -> &Subject<ViewFileList> {
        &self.files
    }

    /// Observable filtered list.
    pub fn filtered_files(&self) -> &Subject<ViewFileList> {
        &self.filtered_files
    }

    fn apply_model(&self, model: FileMap) {
        let lists = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            // Diff against the previous snapshot.
            let removed: Vec<String> = state
                .prev_model
                .keys()
                .filter(|name| !model.contains_key(*name))
                .cloned()
                .collect();
            let mut added = Vec::new();
            let mut updated = Vec::new();
            for (name, file) in &model {
                match state.prev_model.get(name) {
                    None => added.push(name.clone()),
                    Some(prev) => {
                        if model_changed(file, prev) {
                            updated.push(name.clone());
                        }
                    }
                }
            }
            debug!(
                added = added.len(),
                updated = updated.len(),
                removed = removed.len(),
                "applying model snapshot"
            );

            let comparator = state.comparator.clone();
            let mut re_sort = false;
            let mut rebuild_indices = false;

            // Updates go first, in place, while indices are still valid. A
            // re-sort is only needed if an update moved a file relative to
            // its own previous projection.
            for name in &updated {
                let (Some(&index), Some(model_file)) = (state.indices.get(name), model.get(name))
                else {
                    continue;
                };
                let old = &state.files[index];
                let new = ViewFile::from_model(model_file, old.is_selected);
                if let Some(compare) = &comparator {
                    if compare(old, &new) != Ordering::Equal {
                        re_sort = true;
                    }
                }
                state.files[index] = new;
            }

            // Additions append; their sorted position is unknown.
            for name in &added {
                let Some(model_file) = model.get(name) else {
                    continue;
                };
                re_sort = true;
                state.files.push(ViewFile::from_model(model_file, false));
                state.indices.insert(name.clone(), state.files.len() - 1);
            }

            // Removals splice; order is preserved but indices shift.
            for name in &removed {
                rebuild_indices = true;
                if let Some(position) = state.files.iter().position(|file| &file.name == name) {
                    state.files.remove(position);
                }
                state.indices.remove(name);
            }

            if re_sort {
                if let Some(compare) = &comparator {
                    debug!("re-sorting view files");
                    rebuild_indices = true;
                    state.files.sort_by(|a, b| compare(a, b));
                }
            }
            if rebuild_indices {
                state.rebuild_indices();
            }

            state.prev_model = model;
            state.lists()
        };
        self.publish(lists);
    }

    /// Mark one file as the selected one, unselecting any other. Selecting
    /// an unknown name is reported and leaves everything unchanged;
    /// selecting the already-selected file is a no-op.
    pub fn set_selected(&self, name: &str) {
        let lists = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let Some(&index) = state.indices.get(name) else {
                error!(file = name, "cannot select unknown file");
                return;
            };
            if state.files[index].is_selected {
                return;
            }
            if let Some(position) = state.files.iter().position(|file| file.is_selected) {
                state.files[position] = state.files[position].with_selected(false);
            }
            state.files[index] = state.files[index].with_selected(true);
            state.lists()
        };
        self.publish(lists);
    }

    /// Clear the selection, if any.
    pub fn unset_selected(&self) {
        let lists = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let Some(position) = state.files.iter().position(|file| file.is_selected) else {
                return;
            };
            state.files[position] = state.files[position].with_selected(false);
            state.lists()
        };
        self.publish(lists);
    }

    /// Queue a file for download.
    pub async fn queue(&self, name: &str) -> Reaction {
        debug!(file = name, "queue view file");
        self.run_command(FileCommand::Queue, name).await
    }

    /// Stop a queued or downloading file.
    pub async fn stop(&self, name: &str) -> Reaction {
        debug!(file = name, "stop view file");
        self.run_command(FileCommand::Stop, name).await
    }

    /// Extract a downloaded archive.
    pub async fn extract(&self, name: &str) -> Reaction {
        debug!(file = name, "extract view file");
        self.run_command(FileCommand::Extract, name).await
    }

    /// Delete the local copy of a file.
    pub async fn delete_local(&self, name: &str) -> Reaction {
        debug!(file = name, "locally delete view file");
        self.run_command(FileCommand::DeleteLocal, name).await
    }

    /// Delete the remote copy of a file.
    pub async fn delete_remote(&self, name: &str) -> Reaction {
        debug!(file = name, "remotely delete view file");
        self.run_command(FileCommand::DeleteRemote, name).await
    }

    async fn run_command(&self, command: FileCommand, name: &str) -> Reaction {
        let known = self.state.lock().prev_model.contains_key(name);
        if !known {
            error!(file = name, "file for action not found");
            return Reaction::failed(format!("File '{name}' not found"));
        }
        match command {
            FileCommand::Queue => self.model.queue(name).await,
            FileCommand::Stop => self.model.stop(name).await,
            FileCommand::Extract => self.model.extract(name).await,
            FileCommand::DeleteLocal => self.model.delete_local(name).await,
            FileCommand::DeleteRemote => self.model.delete_remote(name).await,
        }
    }

    /// Replace the filter and republish the filtered list. The full list is
    /// unaffected.
    pub fn set_filter_criteria(&self, criteria: Option<Arc<dyn ViewFileFilterCriteria>>) {
        let filtered = {
            let mut guard = self.state.lock();
            guard.filter = criteria;
            guard.lists().1
        };
        self.filtered_files.next(filtered);
    }

    /// Replace the comparator, re-sort the current list and republish both
    /// lists.
    pub fn set_comparator(&self, comparator: Option<ViewFileComparator>) {
        let lists = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state.comparator = comparator;
            if let Some(compare) = state.comparator.clone() {
                debug!("re-sorting view files");
                state.files.sort_by(|a, b| compare(a, b));
            }
            state.rebuild_indices();
            state.lists()
        };
        self.publish(lists);
    }

    fn publish(&self, (full, filtered): (ViewFileList, ViewFileList)) {
        self.files.next(full);
        self.filtered_files.next(filtered);
    }
}
