//! UI-facing projection of a model file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use driftsync_model::{FileState, ModelFile};

/// Display status of a file. Superset of [`FileState`]: `Stopped` is
/// synthesized for a default-state file that exists on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewFileStatus {
    Default,
    Queued,
    Downloading,
    Downloaded,
    Stopped,
    Deleted,
    Extracting,
    Extracted,
    ExtractFailed,
}

/// One row of the file list: a model snapshot reshaped for display, plus
/// derived progress, permitted actions, and transient selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFile {
    /// Unique name, same identity as the model file.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_dir: bool,
    /// Local size in bytes; unknown sizes render as zero.
    pub local_size: u64,
    /// Remote size in bytes; unknown sizes render as zero.
    pub remote_size: u64,
    /// Download progress in whole percent, truncated, in `0..=100`.
    pub percent_downloaded: u8,
    /// Display status.
    pub status: ViewFileStatus,
    /// Transfer speed in bytes per second, if transferring.
    pub downloading_speed: Option<u64>,
    /// Estimated seconds remaining, if transferring.
    pub eta: Option<u64>,
    /// Full path on the local side.
    pub full_path: String,
    /// Whether this file is an archive.
    pub is_archive: bool,
    /// Whether this row is the selected one. At most one row is selected.
    pub is_selected: bool,
    /// Whether the queue action is permitted.
    pub is_queueable: bool,
    /// Whether the stop action is permitted.
    pub is_stoppable: bool,
    /// Whether the extract action is permitted.
    pub is_extractable: bool,
    /// Whether the local delete action is permitted.
    pub is_locally_deletable: bool,
    /// Whether the remote delete action is permitted.
    pub is_remotely_deletable: bool,
    /// When the local copy was created.
    pub local_created_timestamp: Option<DateTime<Utc>>,
    /// When the local copy was last modified.
    pub local_modified_timestamp: Option<DateTime<Utc>>,
    /// When the remote copy was created.
    pub remote_created_timestamp: Option<DateTime<Utc>>,
    /// When the remote copy was last modified.
    pub remote_modified_timestamp: Option<DateTime<Utc>>,
}

fn classify(state: FileState, local_size: u64, remote_size: u64) -> ViewFileStatus {
    match state {
        FileState::Default => {
            if local_size > 0 && remote_size > 0 {
                ViewFileStatus::Stopped
            } else {
                ViewFileStatus::Default
            }
        }
        FileState::Queued => ViewFileStatus::Queued,
        FileState::Downloading => ViewFileStatus::Downloading,
        FileState::Downloaded => ViewFileStatus::Downloaded,
        FileState::Deleted => ViewFileStatus::Deleted,
        FileState::Extracting => ViewFileStatus::Extracting,
        FileState::Extracted => ViewFileStatus::Extracted,
        FileState::ExtractFailed => ViewFileStatus::ExtractFailed,
    }
}

fn percent_downloaded(local_size: u64, remote_size: u64) -> u8 {
    if remote_size == 0 {
        return 100;
    }
    // truncated, never rounded; local may exceed remote mid-sync
    let percent = 100 * u128::from(local_size) / u128::from(remote_size);
    percent.min(100) as u8
}

impl ViewFile {
    /// Project one model snapshot, carrying over the selection flag.
    pub fn from_model(model: &ModelFile, is_selected: bool) -> Self {
        let local_size = model.local_size.unwrap_or(0);
        let remote_size = model.remote_size.unwrap_or(0);
        let status = classify(model.state, local_size, remote_size);

        use ViewFileStatus as S;
        let is_queueable =
            matches!(status, S::Default | S::Stopped | S::Deleted) && remote_size > 0;
        let is_stoppable = matches!(status, S::Queued | S::Downloading);
        let extract_like = matches!(
            status,
            S::Default | S::Stopped | S::Downloaded | S::Extracted | S::ExtractFailed
        );
        let is_extractable = extract_like && local_size > 0;
        let is_locally_deletable = extract_like && local_size > 0;
        let is_remotely_deletable = (extract_like || status == S::Deleted) && remote_size > 0;

        Self {
            name: model.name.clone(),
            is_dir: model.is_dir,
            local_size,
            remote_size,
            percent_downloaded: percent_downloaded(local_size, remote_size),
            status,
            downloading_speed: model.downloading_speed,
            eta: model.eta,
            full_path: model.full_path.clone(),
            is_archive: model.is_extractable,
            is_selected,
            is_queueable,
            is_stoppable,
            is_extractable,
            is_locally_deletable,
            is_remotely_deletable,
            local_created_timestamp: model.local_created_timestamp,
            local_modified_timestamp: model.local_modified_timestamp,
            remote_created_timestamp: model.remote_created_timestamp,
            remote_modified_timestamp: model.remote_modified_timestamp,
        }
    }

    /// Copy of this row with the selection flag replaced.
    pub fn with_selected(&self, is_selected: bool) -> Self {
        Self {
            is_selected,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftsync_test_utils::model_file;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn sized(name: &str, state: FileState, local: u64, remote: u64) -> ModelFile {
        let mut model = model_file(name);
        model.state = state;
        model.local_size = Some(local);
        model.remote_size = Some(remote);
        model
    }

    #[test]
    fn percent_is_truncated_not_rounded() {
        let view = ViewFile::from_model(&sized("a", FileState::Downloading, 1, 3), false);
        assert_eq!(view.percent_downloaded, 33);
    }

    #[test]
    fn zero_remote_size_means_fully_downloaded() {
        let view = ViewFile::from_model(&sized("a", FileState::Default, 0, 0), false);
        assert_eq!(view.percent_downloaded, 100);
    }

    #[test]
    fn percent_is_capped_at_one_hundred() {
        // local can briefly exceed remote while the remote scan is stale
        let view = ViewFile::from_model(&sized("a", FileState::Downloading, 300, 200), false);
        assert_eq!(view.percent_downloaded, 100);
    }

    #[test]
    fn default_with_both_sizes_becomes_stopped() {
        let view = ViewFile::from_model(&sized("a", FileState::Default, 50, 200), false);
        assert_eq!(view.status, ViewFileStatus::Stopped);
        assert!(view.is_queueable);
        assert!(!view.is_stoppable);
    }

    #[test]
    fn default_without_local_copy_stays_default() {
        let view = ViewFile::from_model(&sized("a", FileState::Default, 0, 200), false);
        assert_eq!(view.status, ViewFileStatus::Default);
    }

    #[test]
    fn permission_flags_per_status() {
        let queued = ViewFile::from_model(&sized("a", FileState::Queued, 0, 200), false);
        assert!(queued.is_stoppable);
        assert!(!queued.is_queueable);
        assert!(!queued.is_extractable);

        let downloaded = ViewFile::from_model(&sized("a", FileState::Downloaded, 200, 200), false);
        assert!(downloaded.is_extractable);
        assert!(downloaded.is_locally_deletable);
        assert!(downloaded.is_remotely_deletable);
        assert!(!downloaded.is_queueable);

        let failed = ViewFile::from_model(&sized("a", FileState::ExtractFailed, 200, 200), false);
        assert!(failed.is_extractable);
        assert!(failed.is_locally_deletable);
        assert!(failed.is_remotely_deletable);

        let deleted = ViewFile::from_model(&sized("a", FileState::Deleted, 0, 200), false);
        assert!(deleted.is_queueable);
        assert!(deleted.is_remotely_deletable);
        assert!(!deleted.is_locally_deletable);
    }

    #[test]
    fn unknown_sizes_render_as_zero() {
        let mut model = model_file("a");
        model.local_size = None;
        model.remote_size = None;
        let view = ViewFile::from_model(&model, false);
        assert_eq!(view.local_size, 0);
        assert_eq!(view.remote_size, 0);
    }

    proptest! {
        #[test]
        fn percent_is_always_within_bounds(local in any::<u64>(), remote in any::<u64>()) {
            let view = ViewFile::from_model(
                &sized("a", FileState::Downloading, local, remote),
                false,
            );
            prop_assert!(view.percent_downloaded <= 100);
        }
    }
}
