//! View projection layer for driftsync
//!
//! Turns the authoritative model file map into the list the UI renders:
//! - [`ViewFile`]: one row, with derived progress, status and permitted actions
//! - [`ViewFileService`]: the projection engine: incremental diff, stable
//!   ordering, filtering, selection, and action delegation
//! - [`ViewFileFilterService`] / [`ViewFileSortService`]: translate option
//!   state into filter criteria and comparators
//! - [`ViewFileOptionsStore`]: display preferences with durable storage
//! - [`StreamRegistry`]: composition root wiring everything to the stream

pub mod file;
pub mod filter;
pub mod filter_service;
pub mod options;
pub mod registry;
pub mod service;
pub mod sort;
pub mod sort_service;

pub use file::{ViewFile, ViewFileStatus};
pub use filter::{AndCriteria, NameFilterCriteria, StatusFilterCriteria, ViewFileFilterCriteria};
pub use filter_service::ViewFileFilterService;
pub use options::{
    FileSettingsStorage, MemorySettingsStorage, SettingsStorage, ViewFileOptions,
    ViewFileOptionsStore,
};
pub use registry::StreamRegistry;
pub use service::{ViewFileList, ViewFileService};
pub use sort::{comparator_for, SortMethod, ViewFileComparator};
pub use sort_service::ViewFileSortService;
