use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::{
    client::local_file::LocalFile,
    cloudinary::CloudinaryClient,
    constants::{
        IMAGE_UPLOAD_FAILED, VIDEO_DELETE_FAILED, VIDEOS_LOAD_FAILED, VIDEO_UPLOAD_FAILED,
    },
    entities::media_asset::{
        MediaAsset, MessageResponse, ResourceType, StoragePolicy, UploadRequest, UploadedMedia,
    },
    errors::AppError,
    upload_limit::{UploadLimit, UploadLimitSummary},
};

const LIMIT_LOOKUP_FAILED: &str = "No se pudo consultar el límite de subida";

/// Carries a selected file to wherever it is stored.
#[async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, kind: ResourceType, file: &LocalFile) -> Result<UploadedMedia, AppError>;
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// Talks to this service's HTTP API. The preferred upload path.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: Client,
    base_url: Url,
}

impl RelayClient {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("invalid relay URL: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(RelayClient {
            http: Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("invalid relay path {path}: {e}")))
    }

    /// Limit the server enforces, so the client can check files up front.
    pub async fn upload_limit(&self) -> Result<UploadLimit, AppError> {
        let response = self
            .http
            .get(self.url("upload/limits")?)
            .send()
            .await
            .map_err(|e| AppError::remote_with_details(LIMIT_LOOKUP_FAILED, e))?;

        let summary: UploadLimitSummary = decode(response, LIMIT_LOOKUP_FAILED).await?;
        Ok(summary.into())
    }

    #[instrument(skip(self))]
    pub async fn list_videos(&self) -> Result<Vec<MediaAsset>, AppError> {
        let response = self
            .http
            .get(self.url("videos")?)
            .send()
            .await
            .map_err(|e| AppError::remote_with_details(VIDEOS_LOAD_FAILED, e))?;

        decode(response, VIDEOS_LOAD_FAILED).await
    }

    #[instrument(skip(self))]
    pub async fn delete_video(&self, public_id: &str) -> Result<MessageResponse, AppError> {
        let path = format!("videos/{}", urlencoding::encode(public_id));
        let response = self
            .http
            .delete(self.url(&path)?)
            .send()
            .await
            .map_err(|e| AppError::remote_with_details(VIDEO_DELETE_FAILED, e))?;

        decode(response, VIDEO_DELETE_FAILED).await
    }
}

#[async_trait]
impl UploadTransport for RelayClient {
    #[instrument(skip(self, file), fields(file_name = %file.name, size = file.size()))]
    async fn upload(&self, kind: ResourceType, file: &LocalFile) -> Result<UploadedMedia, AppError> {
        let (path, failure) = match kind {
            ResourceType::Image => ("images/upload", IMAGE_UPLOAD_FAILED),
            ResourceType::Video => ("upload", VIDEO_UPLOAD_FAILED),
        };

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        if let Some(content_type) = file.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::Validation(format!("Tipo de archivo inválido: {e}")))?;
        }

        debug!(%kind, "Sending file to relay");
        let response = self
            .http
            .post(self.url(path)?)
            .multipart(Form::new().part("file", part))
            .send()
            .await
            .map_err(|e| AppError::remote_with_details(failure, e))?;

        decode(response, failure).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, failure: &str) -> Result<T, AppError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Relay request failed");
        return Err(match serde_json::from_str::<RelayErrorBody>(&body) {
            Ok(RelayErrorBody { error, details }) if status.is_client_error() && details.is_none() => {
                AppError::Validation(error)
            }
            Ok(RelayErrorBody { error, details }) => AppError::RemoteService { message: error, details },
            Err(_) => AppError::remote_with_details(failure, format!("HTTP {status}")),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| AppError::remote_with_details(failure, e))
}

/// Uploads straight from the client to the media host with an unsigned preset.
///
/// Deprecated alternative to [`RelayClient`]: it skips the relay's validation
/// and logging and is kept only for deployments without the relay.
#[derive(Debug, Clone)]
pub struct DirectUploadClient {
    host: CloudinaryClient,
    policy: StoragePolicy,
}

impl DirectUploadClient {
    pub fn new(host: CloudinaryClient, policy: StoragePolicy) -> Self {
        DirectUploadClient { host, policy }
    }
}

#[async_trait]
impl UploadTransport for DirectUploadClient {
    async fn upload(&self, kind: ResourceType, file: &LocalFile) -> Result<UploadedMedia, AppError> {
        let failure = match kind {
            ResourceType::Image => IMAGE_UPLOAD_FAILED,
            ResourceType::Video => VIDEO_UPLOAD_FAILED,
        };
        let request = UploadRequest {
            resource_type: kind,
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            bytes: file.bytes.clone(),
            upload_preset: self.policy.preset_for(kind).to_string(),
            folder: Some(self.policy.folder_for(kind).to_string()),
        };

        let asset = self
            .host
            .upload_asset(request)
            .await
            .map_err(|e| AppError::remote_with_details(failure, e))?;

        UploadedMedia::try_from(asset).map_err(|reason| AppError::remote_with_details(failure, reason))
    }
}
