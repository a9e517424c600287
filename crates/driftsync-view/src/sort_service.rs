//! Translates option state into a sort comparator.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::options::{ViewFileOptions, ViewFileOptionsStore};
use crate::service::ViewFileService;
use crate::sort::{comparator_for, SortMethod};

/// Watches the display options and pushes the matching comparator into the
/// view service when the sort method changes.
pub struct ViewFileSortService {
    view: Arc<ViewFileService>,
    applied: Mutex<Option<SortMethod>>,
}

impl ViewFileSortService {
    /// Create the service and subscribe it to the options store. The current
    /// sort method is applied immediately.
    pub fn attach(view: Arc<ViewFileService>, options: &ViewFileOptionsStore) -> Arc<Self> {
        let service = Arc::new(Self {
            view,
            applied: Mutex::new(None),
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
        if *applied == Some(options.sort_method) {
            return;
        }
        *applied = Some(options.sort_method);
        debug!(sort_method = ?options.sort_method, "comparator changed");
        self.view.set_comparator(Some(comparator_for(options.sort_method)));
    }
}
