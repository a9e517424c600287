//! Translates option state into filter criteria.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::file::ViewFileStatus;
use crate::filter::{AndCriteria, NameFilterCriteria, StatusFilterCriteria, ViewFileFilterCriteria};
use crate::options::{ViewFileOptions, ViewFileOptionsStore};
use crate::service::ViewFileService;

struct AppliedFilters {
    status: Option<Arc<StatusFilterCriteria>>,
    name: Option<Arc<NameFilterCriteria>>,
}

/// Watches the display options and pushes a rebuilt filter into the view
/// service whenever the status or name filter actually changes. Comparison
/// is by value, so republished but unchanged options do nothing.
pub struct ViewFileFilterService {
    view: Arc<ViewFileService>,
    applied: Mutex<AppliedFilters>,
}

impl ViewFileFilterService {
    /// Create the service and subscribe it to the options store. The current
    /// options are applied immediately.
    pub fn attach(view: Arc<ViewFileService>, options: &ViewFileOptionsStore) -> Arc<Self> {
        let service = Arc::new(Self {
            view,
            applied: Mutex::new(AppliedFilters {
                status: None,
                name: None,
            }),
        });
        let weak = Arc::downgrade(&service);
        options.options().subscribe(move |options| {
            if let Some(service) = weak.upgrade() {
                service.apply(options);
            }
        });
        service
    }

    fn apply(&self, options: &ViewFileOptions) {
        let mut applied = self.applied.lock();
        let mut changed = false;

        let status_changed = applied
            .status
            .as_ref()
            .map_or(true, |filter| filter.status() != options.selected_status_filter);
        if status_changed {
            changed = true;
            debug!(status = ?options.selected_status_filter, "status filter changed");
            applied.status = Some(Arc::new(StatusFilterCriteria::new(
                options.selected_status_filter,
            )));
        }

        let name_changed = applied
            .name
            .as_ref()
            .map_or(true, |filter| filter.query() != options.name_filter);
        if name_changed {
            changed = true;
            debug!(name = %options.name_filter, "name filter changed");
            applied.name = Some(Arc::new(NameFilterCriteria::new(&options.name_filter)));
        }

        if changed {
            let criteria: Option<Arc<dyn ViewFileFilterCriteria>> =
                match (&applied.status, &applied.name) {
                    (Some(status), Some(name)) => {
                        Some(Arc::new(AndCriteria::new(status.clone(), name.clone())) as Arc<_>)
                    }
                    (Some(status), None) => Some(status.clone() as Arc<_>),
                    (None, Some(name)) => Some(name.clone() as Arc<_>),
                    (None, None) => None,
                };
            self.view.set_filter_criteria(criteria);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftsync_model::store::EVENT_INIT;
    use driftsync_model::ModelFileStore;
    use driftsync_stream::StreamEventHandler;
    use driftsync_test_utils::{model_file_json, RecordingBackend};
    use pretty_assertions::assert_eq;

    use crate::options::MemorySettingsStorage;

    fn pipeline() -> (Arc<ModelFileStore>, Arc<ViewFileService>, ViewFileOptionsStore) {
        let model = Arc::new(ModelFileStore::new(Arc::new(RecordingBackend::default())));
        let view = ViewFileService::attach(model.clone());
        let options = ViewFileOptionsStore::new(Arc::new(MemorySettingsStorage::default()));
        (model, view, options)
    }

    fn init(model: &ModelFileStore, files: Vec<serde_json::Value>) {
        model.on_event(EVENT_INIT, &serde_json::Value::Array(files).to_string());
    }

    fn with_state(name: &str, state: &str) -> serde_json::Value {
        let mut json = model_file_json(name);
        json["state"] = serde_json::json!(state);
        json
    }

    #[test]
    fn status_filter_option_narrows_the_filtered_list() {
        let (model, view, options) = pipeline();
        let _service = ViewFileFilterService::attach(view.clone(), &options);
        init(
            &model,
            vec![with_state("alpha", "queued"), with_state("beta", "downloaded")],
        );

        options.set_selected_status_filter(Some(ViewFileStatus::Queued));

        let filtered = view.filtered_files().value();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "alpha");
        assert_eq!(view.files().value().len(), 2);
    }

    #[test]
    fn name_and_status_filters_compose() {
        let (model, view, options) = pipeline();
        let _service = ViewFileFilterService::attach(view.clone(), &options);
        init(
            &model,
            vec![
                with_state("alpha.one", "queued"),
                with_state("alpha.two", "downloaded"),
                with_state("beta", "queued"),
            ],
        );

        options.set_selected_status_filter(Some(ViewFileStatus::Queued));
        options.set_name_filter("alpha");

        let filtered = view.filtered_files().value();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "alpha.one");
    }

    #[test]
    fn clearing_the_filters_restores_the_full_list() {
        let (model, view, options) = pipeline();
        let _service = ViewFileFilterService::attach(view.clone(), &options);
        init(
            &model,
            vec![with_state("alpha", "queued"), with_state("beta", "downloaded")],
        );

        options.set_selected_status_filter(Some(ViewFileStatus::Queued));
        options.set_selected_status_filter(None);
        options.set_name_filter("");

        assert_eq!(view.filtered_files().value().len(), 2);
    }
}
