use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod client;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, upload_limit, use_cases};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{cloudinary, local_storage};

use cloudinary::CloudinaryClient;
use entities::media_asset::StoragePolicy;
use errors::GatewayError;
use repositories::{
    media_gateway::MediaGateway,
    video_documents::{
        DocumentStoreKind, InMemoryVideoDocumentStore, NoopVideoDocumentStore, VideoDocumentStore,
    },
};
use upload_limit::UploadLimit;
use use_cases::media::MediaHandler;

pub struct AppState {
    pub media_handler: MediaHandler,
    pub upload_limit: UploadLimit,
    pub media_host: String,
    pub name: String,
}

impl AppState {
    pub fn new(
        config: &settings::AppConfig,
        gateway: Arc<dyn MediaGateway>,
        documents: Arc<dyn VideoDocumentStore>,
    ) -> Self {
        let media_handler = MediaHandler::new(gateway, documents, StoragePolicy::from(config));

        AppState {
            media_handler,
            upload_limit: config.upload_limit(),
            media_host: config.media_api_url.clone(),
            name: config.name.clone(),
        }
    }

    /// Wires the Cloudinary client and the configured document store.
    pub fn from_config(config: &settings::AppConfig) -> Result<Self, GatewayError> {
        let gateway = Arc::new(CloudinaryClient::from_config(config)?);

        let documents: Arc<dyn VideoDocumentStore> = match config.document_store {
            DocumentStoreKind::Noop => Arc::new(NoopVideoDocumentStore),
            DocumentStoreKind::Memory => Arc::new(InMemoryVideoDocumentStore::new()),
        };

        Ok(AppState::new(config, gateway, documents))
    }
}
