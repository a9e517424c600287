//! Comparators over view files.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::file::{ViewFile, ViewFileStatus};

/// User-selectable sort order for the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMethod {
    /// Active transfers first, then by name.
    #[default]
    Status,
    /// Name, ascending.
    NameAsc,
    /// Name, descending.
    NameDesc,
}

/// Total order over view file pairs.
pub type ViewFileComparator = Arc<dyn Fn(&ViewFile, &ViewFile) -> Ordering + Send + Sync>;

// Active work sorts first. Extract-failed ranks with downloaded so a failed
// archive stays next to its finished peers, and deleted intermixes with
// default.
fn status_priority(status: ViewFileStatus) -> u8 {
    match status {
        ViewFileStatus::Extracting => 0,
        ViewFileStatus::Downloading => 1,
        ViewFileStatus::Queued => 2,
        ViewFileStatus::Extracted => 3,
        ViewFileStatus::Downloaded | ViewFileStatus::ExtractFailed => 4,
        ViewFileStatus::Stopped => 5,
        ViewFileStatus::Default | ViewFileStatus::Deleted => 6,
    }
}

/// Build the comparator for a sort method.
pub fn comparator_for(method: SortMethod) -> ViewFileComparator {
    match method {
        SortMethod::Status => Arc::new(|a, b| {
            status_priority(a.status)
                .cmp(&status_priority(b.status))
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortMethod::NameAsc => Arc::new(|a, b| a.name.cmp(&b.name)),
        SortMethod::NameDesc => Arc::new(|a, b| b.name.cmp(&a.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftsync_model::FileState;
    use driftsync_test_utils::model_file;
    use pretty_assertions::assert_eq;

    fn view(name: &str, state: FileState) -> ViewFile {
        let mut model = model_file(name);
        model.state = state;
        ViewFile::from_model(&model, false)
    }

    #[test]
    fn status_comparator_puts_active_work_first() {
        let mut files = vec![
            view("finished", FileState::Downloaded),
            view("active", FileState::Downloading),
            view("waiting", FileState::Queued),
            view("unpacking", FileState::Extracting),
        ];
        files.sort_by({
            let cmp = comparator_for(SortMethod::Status);
            move |a, b| cmp(a, b)
        });

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["unpacking", "active", "waiting", "finished"]);
    }

    #[test]
    fn status_comparator_breaks_ties_by_name() {
        let cmp = comparator_for(SortMethod::Status);
        let a = view("alpha", FileState::Queued);
        let b = view("beta", FileState::Queued);
        assert_eq!(cmp(&a, &b), Ordering::Less);
        assert_eq!(cmp(&b, &a), Ordering::Greater);
        assert_eq!(cmp(&a, &a.clone()), Ordering::Equal);
    }

    #[test]
    fn name_comparison_is_case_sensitive() {
        let cmp = comparator_for(SortMethod::NameAsc);
        // uppercase sorts before lowercase in code point order
        assert_eq!(
            cmp(&view("Zebra", FileState::Queued), &view("apple", FileState::Queued)),
            Ordering::Less
        );
    }

    #[test]
    fn name_descending_reverses_ascending() {
        let asc = comparator_for(SortMethod::NameAsc);
        let desc = comparator_for(SortMethod::NameDesc);
        let a = view("a", FileState::Queued);
        let b = view("b", FileState::Downloaded);
        assert_eq!(asc(&a, &b), desc(&b, &a));
    }
}
