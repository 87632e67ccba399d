#![allow(dead_code)]

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use async_trait::async_trait;
use media_gallery_backend::{
    entities::media_asset::{DestroyOutcome, ListQuery, MediaAsset, ResourceType, UploadRequest},
    errors::GatewayError,
    repositories::{
        media_gateway::MediaGateway,
        video_documents::{DocumentStoreKind, InMemoryVideoDocumentStore},
    },
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use parking_lot::Mutex;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use std::{
    net::TcpListener,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

pub const TEST_LIMIT_KB: u64 = 64;

/// Media host double that keeps assets in memory.
#[derive(Default)]
pub struct FakeGateway {
    uploads: Mutex<Vec<UploadRequest>>,
    assets: Mutex<Vec<MediaAsset>>,
    destroyed: Mutex<Vec<String>>,
    fail_uploads: AtomicBool,
    fail_listing: AtomicBool,
    fail_destroy: AtomicBool,
    drop_secure_url: AtomicBool,
}

impl FakeGateway {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().len()
    }

    pub fn last_upload(&self) -> Option<UploadRequest> {
        self.uploads.lock().last().cloned()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().clone()
    }

    pub fn seed(&self, public_id: &str, resource_type: ResourceType) {
        self.assets.lock().push(asset(public_id, resource_type, 1024));
    }

    pub fn fail_uploads(&self) {
        self.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    pub fn fail_destroy(&self) {
        self.fail_destroy.store(true, Ordering::SeqCst);
    }

    pub fn drop_secure_url(&self) {
        self.drop_secure_url.store(true, Ordering::SeqCst);
    }
}

pub fn asset(public_id: &str, resource_type: ResourceType, bytes: u64) -> MediaAsset {
    let mut extra = serde_json::Map::new();
    extra.insert("type".into(), serde_json::json!("upload"));
    extra.insert("created_at".into(), serde_json::json!("2024-05-01T10:00:00Z"));

    MediaAsset {
        public_id: public_id.to_string(),
        secure_url: format!(
            "https://res.cloudinary.test/demo/{}/upload/{}.mp4",
            resource_type, public_id
        ),
        resource_type,
        bytes,
        format: "mp4".to_string(),
        extra,
    }
}

#[async_trait]
impl MediaGateway for FakeGateway {
    async fn upload(&self, request: UploadRequest) -> Result<MediaAsset, GatewayError> {
        let mut uploads = self.uploads.lock();
        uploads.push(request.clone());

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 400,
                message: "Upload preset not found".to_string(),
            });
        }

        let public_id = format!(
            "{}/asset{}",
            request.folder.unwrap_or_default(),
            uploads.len()
        );
        let mut created = asset(&public_id, request.resource_type, request.bytes.len() as u64);
        if self.drop_secure_url.load(Ordering::SeqCst) {
            created.secure_url.clear();
        }

        self.assets.lock().push(created.clone());
        Ok(created)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<MediaAsset>, GatewayError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection refused".to_string()));
        }

        Ok(self
            .assets
            .lock()
            .iter()
            .filter(|a| a.resource_type == query.resource_type)
            .filter(|a| a.public_id.starts_with(&query.prefix))
            .take(query.max_results as usize)
            .cloned()
            .collect())
    }

    async fn destroy(
        &self,
        resource_type: ResourceType,
        public_id: &str,
    ) -> Result<DestroyOutcome, GatewayError> {
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 500,
                message: "General error".to_string(),
            });
        }

        self.destroyed.lock().push(public_id.to_string());

        let mut assets = self.assets.lock();
        let before = assets.len();
        assets.retain(|a| !(a.public_id == public_id && a.resource_type == resource_type));

        if assets.len() < before {
            Ok(DestroyOutcome::Deleted)
        } else {
            Ok(DestroyOutcome::NotFound)
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub gateway: Arc<FakeGateway>,
    pub documents: Arc<InMemoryVideoDocumentStore>,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_limit(TEST_LIMIT_KB).await
    }

    pub async fn spawn_with_limit(max_upload_kb: u64) -> Self {
        let mut config = test_config();
        config.max_upload_kb = max_upload_kb;

        let gateway = Arc::new(FakeGateway::default());
        let documents = Arc::new(InMemoryVideoDocumentStore::new());

        let state = web::Data::new(AppState::new(&config, gateway.clone(), documents.clone()));
        let limit = config.upload_limit();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(NormalizePath::trim())
                .configure(|cfg| configure_routes(cfg, limit))
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(format!("{}/health", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            gateway,
            documents,
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn upload(&self, path: &str, file_name: &str, bytes: Vec<u8>) -> Response {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("video/mp4")
            .unwrap();

        self.client
            .post(self.url(path))
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .expect("Failed to send upload")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Media Gallery Test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        worker_count: 1,
        cors_allowed_origins: vec!["*".to_string()],
        media_api_url: "https://api.cloudinary.test".to_string(),
        cloud_name: "demo".to_string(),
        api_key: "test_key".to_string(),
        api_secret: "test_secret".to_string(),
        image_upload_preset: "images".to_string(),
        video_upload_preset: "videos".to_string(),
        image_folder: "images".to_string(),
        video_folder: "videos".to_string(),
        video_list_prefix: "videos/".to_string(),
        video_list_max_results: 100,
        max_upload_kb: TEST_LIMIT_KB,
        document_store: DocumentStoreKind::Memory,
    }
}
