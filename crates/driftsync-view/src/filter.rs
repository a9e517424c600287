//! Filter predicates over view files.

use std::sync::Arc;

use crate::file::{ViewFile, ViewFileStatus};

/// Predicate deciding whether a row stays in the filtered list.
pub trait ViewFileFilterCriteria: Send + Sync {
    fn matches(&self, file: &ViewFile) -> bool;
}

/// Conjunction of two criteria.
pub struct AndCriteria {
    a: Arc<dyn ViewFileFilterCriteria>,
    b: Arc<dyn ViewFileFilterCriteria>,
}

impl AndCriteria {
    pub fn new(a: Arc<dyn ViewFileFilterCriteria>, b: Arc<dyn ViewFileFilterCriteria>) -> Self {
        Self { a, b }
    }
}

impl ViewFileFilterCriteria for AndCriteria {
    fn matches(&self, file: &ViewFile) -> bool {
        self.a.matches(file) && self.b.matches(file)
    }
}

/// Keeps rows with one specific status; `None` keeps everything.
pub struct StatusFilterCriteria {
    status: Option<ViewFileStatus>,
}

impl StatusFilterCriteria {
    pub fn new(status: Option<ViewFileStatus>) -> Self {
        Self { status }
    }

    /// The status this criteria was built with.
    pub fn status(&self) -> Option<ViewFileStatus> {
        self.status
    }
}

impl ViewFileFilterCriteria for StatusFilterCriteria {
    fn matches(&self, file: &ViewFile) -> bool {
        match self.status {
            None => true,
            Some(status) => file.status == status,
        }
    }
}

/// Case-insensitive substring match on the name. Dots and spaces are
/// interchangeable separators, so "the query" also matches "the.query"; the
/// three lowercase variants are precomputed at construction.
pub struct NameFilterCriteria {
    query: String,
    candidates: Vec<String>,
}

impl NameFilterCriteria {
    pub fn new(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let candidates = vec![
            lowered.clone(),
            lowered
                .chars()
                .map(|c| if c.is_whitespace() { '.' } else { c })
                .collect(),
            lowered.replace('.', " "),
        ];
        Self {
            query: query.to_string(),
            candidates,
        }
    }

    /// The raw query this criteria was built with.
    pub fn query(&self) -> &str {
        &self.query
    }
}

impl ViewFileFilterCriteria for NameFilterCriteria {
    fn matches(&self, file: &ViewFile) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let name = file.name.to_lowercase();
        self.candidates.iter().any(|candidate| name.contains(candidate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftsync_model::FileState;
    use driftsync_test_utils::model_file;

    fn view(name: &str, state: FileState) -> ViewFile {
        let mut model = model_file(name);
        model.state = state;
        ViewFile::from_model(&model, false)
    }

    #[test]
    fn status_criteria_with_none_matches_everything() {
        let criteria = StatusFilterCriteria::new(None);
        assert!(criteria.matches(&view("a", FileState::Queued)));
        assert!(criteria.matches(&view("b", FileState::Downloaded)));
    }

    #[test]
    fn status_criteria_keeps_only_its_status() {
        let criteria = StatusFilterCriteria::new(Some(ViewFileStatus::Queued));
        assert!(criteria.matches(&view("alpha", FileState::Queued)));
        assert!(!criteria.matches(&view("beta", FileState::Downloaded)));
    }

    #[test]
    fn name_criteria_is_case_insensitive() {
        let criteria = NameFilterCriteria::new("ALPHA");
        assert!(criteria.matches(&view("my.Alpha.file", FileState::Default)));
        assert!(!criteria.matches(&view("beta", FileState::Default)));
    }

    #[test]
    fn dots_and_spaces_are_interchangeable() {
        let dotted = view("Some.Great.File", FileState::Default);
        assert!(NameFilterCriteria::new("great file").matches(&dotted));

        let spaced = view("Some Great File", FileState::Default);
        assert!(NameFilterCriteria::new("great.file").matches(&spaced));
    }

    #[test]
    fn empty_query_matches_everything() {
        let criteria = NameFilterCriteria::new("");
        assert!(criteria.matches(&view("anything", FileState::Default)));
    }

    #[test]
    fn and_criteria_requires_both() {
        let criteria = AndCriteria::new(
            Arc::new(StatusFilterCriteria::new(Some(ViewFileStatus::Queued))),
            Arc::new(NameFilterCriteria::new("alpha")),
        );
        assert!(criteria.matches(&view("alpha", FileState::Queued)));
        assert!(!criteria.matches(&view("alpha", FileState::Downloaded)));
        assert!(!criteria.matches(&view("beta", FileState::Queued)));
    }
}
