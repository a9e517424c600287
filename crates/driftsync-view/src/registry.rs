//! Composition root wiring the stores to the stream.

use std::sync::Arc;

use driftsync_model::{CommandClient, ModelFileStore, ServerStatusStore};
use driftsync_stream::{
    ConnectedStore, HttpStreamConnector, StreamDispatcher, StreamTransport,
};

use crate::filter_service::ViewFileFilterService;
use crate::options::{SettingsStorage, ViewFileOptionsStore};
use crate::service::ViewFileService;
use crate::sort_service::ViewFileSortService;

/// All singleton stores, wired once at startup.
///
/// Construction registers every stream handler on the dispatcher in a fixed
/// order (connection status, then server status, then the file model) and
/// subscribes the view pipeline, so callers only hold this registry and
/// [`start`](Self::start) the transport.
pub struct StreamRegistry {
    base_url: String,
    /// Event-name to handler routing for the stream transport.
    pub dispatcher: Arc<StreamDispatcher>,
    /// Connection status of the stream.
    pub connected: Arc<ConnectedStore>,
    /// Server and controller health.
    pub server_status: Arc<ServerStatusStore>,
    /// Authoritative file model.
    pub model_files: Arc<ModelFileStore>,
    /// Projected view file list.
    pub view_files: Arc<ViewFileService>,
    /// Display options.
    pub options: Arc<ViewFileOptionsStore>,
    /// Keeps the view filter in sync with the options.
    pub filter_service: Arc<ViewFileFilterService>,
    /// Keeps the view comparator in sync with the options.
    pub sort_service: Arc<ViewFileSortService>,
}

impl StreamRegistry {
    /// Wire every store against the server at `base_url`.
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn SettingsStorage>) -> Self {
        let base_url = base_url.into();
        let dispatcher = Arc::new(StreamDispatcher::new());

        let connected = Arc::new(ConnectedStore::new());
        dispatcher.register(connected.clone());

        let server_status = Arc::new(ServerStatusStore::new());
        dispatcher.register(server_status.clone());

        let backend = Arc::new(CommandClient::new(base_url.clone()));
        let model_files = Arc::new(ModelFileStore::new(backend));
        dispatcher.register(model_files.clone());

        let view_files = ViewFileService::attach(model_files.clone());

        let options = Arc::new(ViewFileOptionsStore::new(storage));
        let filter_service = ViewFileFilterService::attach(view_files.clone(), &options);
        let sort_service = ViewFileSortService::attach(view_files.clone(), &options);

        Self {
            base_url,
            dispatcher,
            connected,
            server_status,
            model_files,
            view_files,
            options,
            filter_service,
            sort_service,
        }
    }

    /// Open the stream connection and keep it alive. The loop runs until
    /// the returned handle is aborted.
    pub fn start(&self) -> tokio::task::JoinHandle<()> {
        let url = format!("{}/server/stream", self.base_url.trim_end_matches('/'));
        let connector = Arc::new(HttpStreamConnector::new(url));
        StreamTransport::new(connector, self.dispatcher.clone()).start()
    }
}
