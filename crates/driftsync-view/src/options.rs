//! Display options and their persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use driftsync_stream::Subject;

use crate::file::ViewFileStatus;
use crate::sort::SortMethod;

const KEY_SHOW_DETAILS: &str = "view_option.show_details";
const KEY_SORT_METHOD: &str = "view_option.sort_method";
const KEY_PIN_FILTER: &str = "view_option.pin_filter";

/// Display preferences for the file list.
///
/// Show-details, sort method and the filter pin survive restarts; the
/// status and name filters are session-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFileOptions {
    /// Whether the detail panel is shown.
    pub show_details: bool,
    /// Active sort order.
    pub sort_method: SortMethod,
    /// Status to filter on, if any.
    pub selected_status_filter: Option<ViewFileStatus>,
    /// Substring to filter names on; empty means no constraint.
    pub name_filter: String,
    /// Whether the filter bar is pinned open.
    pub pin_filter: bool,
}

impl Default for ViewFileOptions {
    fn default() -> Self {
        Self {
            show_details: false,
            sort_method: SortMethod::Status,
            selected_status_filter: None,
            name_filter: String::new(),
            pin_filter: false,
        }
    }
}

/// Durable key-value storage for settings, JSON-encoded strings by key.
///
/// Storage is best-effort: a read that fails yields nothing and the caller
/// falls back to defaults, a write that fails is logged by the
/// implementation. Settings are never worth failing the application over.
pub trait SettingsStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory storage, for tests and for running without persistence.
#[derive(Default)]
pub struct MemorySettingsStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl SettingsStorage for MemorySettingsStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }
}

/// Storage backed by a single JSON file.
///
/// The whole map is rewritten on every set, through a sibling temp file and
/// an atomic rename so a crash never leaves a half-written settings file.
pub struct FileSettingsStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSettingsStorage {
    /// Open storage at the given path, starting empty if the file is
    /// missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "ignoring corrupt settings file");
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    fn flush(&self, values: &BTreeMap<String, String>) {
        let json = match serde_json::to_string_pretty(values) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode settings");
                return;
            }
        };
        let tmp = self.path.with_extension("tmp");
        let result = fs::write(&tmp, json).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = result {
            warn!(path = %self.path.display(), error = %err, "failed to write settings file");
        }
    }
}

impl SettingsStorage for FileSettingsStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value.to_string());
        self.flush(&values);
    }
}

/// Store broadcasting display option changes.
///
/// Every setter short-circuits when the value is unchanged, so subscribers
/// never see a redundant notification.
pub struct ViewFileOptionsStore {
    options: Subject<ViewFileOptions>,
    storage: Arc<dyn SettingsStorage>,
}

impl ViewFileOptionsStore {
    /// Create the store, seeding the durable options from storage.
    pub fn new(storage: Arc<dyn SettingsStorage>) -> Self {
        let defaults = ViewFileOptions::default();
        let options = ViewFileOptions {
            show_details: load(&*storage, KEY_SHOW_DETAILS).unwrap_or(defaults.show_details),
            sort_method: load(&*storage, KEY_SORT_METHOD).unwrap_or(defaults.sort_method),
            pin_filter: load(&*storage, KEY_PIN_FILTER).unwrap_or(defaults.pin_filter),
            ..defaults
        };
        Self {
            options: Subject::new(options),
            storage,
        }
    }

    /// Observable options.
    pub fn options(&self) -> &Subject<ViewFileOptions> {
        &self.options
    }

    pub fn set_show_details(&self, show_details: bool) {
        let mut options = self.options.value();
        if options.show_details != show_details {
            options.show_details = show_details;
            debug!(show_details, "view option changed");
            store(&*self.storage, KEY_SHOW_DETAILS, &show_details);
            self.options.next(options);
        }
    }

    pub fn set_sort_method(&self, sort_method: SortMethod) {
        let mut options = self.options.value();
        if options.sort_method != sort_method {
            options.sort_method = sort_method;
            debug!(?sort_method, "view option changed");
            store(&*self.storage, KEY_SORT_METHOD, &sort_method);
            self.options.next(options);
        }
    }

    pub fn set_selected_status_filter(&self, status: Option<ViewFileStatus>) {
        let mut options = self.options.value();
        if options.selected_status_filter != status {
            options.selected_status_filter = status;
            debug!(?status, "view option changed");
            self.options.next(options);
        }
    }

    pub fn set_name_filter(&self, name_filter: impl Into<String>) {
        let name_filter = name_filter.into();
        let mut options = self.options.value();
        if options.name_filter != name_filter {
            debug!(name_filter, "view option changed");
            options.name_filter = name_filter;
            self.options.next(options);
        }
    }

    pub fn set_pin_filter(&self, pin_filter: bool) {
        let mut options = self.options.value();
        if options.pin_filter != pin_filter {
            options.pin_filter = pin_filter;
            debug!(pin_filter, "view option changed");
            store(&*self.storage, KEY_PIN_FILTER, &pin_filter);
            self.options.next(options);
        }
    }
}

fn load<T: DeserializeOwned>(storage: &dyn SettingsStorage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring unreadable stored setting");
            None
        }
    }
}

fn store<T: Serialize>(storage: &dyn SettingsStorage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => storage.set(key, &json),
        Err(err) => warn!(key, error = %err, "failed to encode setting"),
    }
}
