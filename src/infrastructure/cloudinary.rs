use std::{fmt, time::Duration};

use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, error, instrument};
use url::Url;
use zeroize::Zeroizing;

use crate::{
    entities::media_asset::{
        DestroyOutcome, ListQuery, MediaAsset, ResourceList, ResourceType, UploadRequest,
    },
    errors::GatewayError,
    settings::AppConfig,
};

const API_VERSION: &str = "v1_1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// HTTP client for the Cloudinary upload and admin APIs.
///
/// Uploads are unsigned and rely on an upload preset; listing and deletion go
/// through the admin API with basic auth.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: Client,
    api_base: Url,
    cloud_name: String,
    api_key: String,
    api_secret: Zeroizing<String>,
}

#[derive(Debug, Deserialize)]
struct HostErrorBody {
    error: HostErrorMessage,
}

#[derive(Debug, Deserialize)]
struct HostErrorMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResourcesResponse {
    #[serde(default)]
    deleted: serde_json::Map<String, serde_json::Value>,
}

impl CloudinaryClient {
    pub fn new(
        api_base: &str,
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let api_base = Url::parse(api_base)
            .map_err(|e| GatewayError::InvalidRequest(format!("media_api_url: {e}")))?;

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GatewayError::from)?;

        Ok(CloudinaryClient {
            http,
            api_base,
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: Zeroizing::new(api_secret.into()),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.media_api_url,
            config.cloud_name.clone(),
            config.api_key.clone(),
            config.api_secret.as_str(),
        )
    }

    /// `{base}/v1_1/{cloud}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidRequest("media_api_url cannot be a base".into()))?
            .pop_if_empty()
            .push(API_VERSION)
            .push(&self.cloud_name)
            .extend(segments);
        Ok(url)
    }

    #[instrument(skip(self, request), fields(resource_type = %request.resource_type, file_name = %request.file_name, size = request.bytes.len()))]
    pub async fn upload_asset(&self, request: UploadRequest) -> Result<MediaAsset, GatewayError> {
        let url = self.endpoint(&[request.resource_type.as_str(), "upload"])?;

        let mut part = Part::bytes(request.bytes).file_name(request.file_name);
        if let Some(content_type) = request.content_type.as_deref() {
            part = part
                .mime_str(content_type)
                .map_err(|e| GatewayError::InvalidRequest(format!("content type: {e}")))?;
        }

        let mut form = Form::new()
            .part("file", part)
            .text("upload_preset", request.upload_preset);
        if let Some(folder) = request.folder.filter(|f| !f.is_empty()) {
            form = form.text("folder", folder);
        }

        debug!(%url, "Sending upload to media host");
        let response = self.http.post(url).multipart(form).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    pub async fn list_assets(&self, query: &ListQuery) -> Result<Vec<MediaAsset>, GatewayError> {
        let url = self.endpoint(&["resources", query.resource_type.as_str(), "upload"])?;

        let response = self
            .http
            .get(url)
            .basic_auth(&self.api_key, Some(self.api_secret.as_str()))
            .query(&[
                ("prefix", query.prefix.clone()),
                ("max_results", query.max_results.to_string()),
            ])
            .send()
            .await?;

        let list: ResourceList = Self::decode(response).await?;
        debug!(count = list.resources.len(), "Listed media host resources");
        Ok(list.resources)
    }

    #[instrument(skip(self))]
    pub async fn destroy_asset(
        &self,
        resource_type: ResourceType,
        public_id: &str,
    ) -> Result<DestroyOutcome, GatewayError> {
        let url = self.endpoint(&["resources", resource_type.as_str(), "upload"])?;

        let response = self
            .http
            .delete(url)
            .basic_auth(&self.api_key, Some(self.api_secret.as_str()))
            .query(&[("public_ids[]", public_id)])
            .send()
            .await?;

        let body: DeleteResourcesResponse = Self::decode(response).await?;
        match body.deleted.get(public_id).and_then(|v| v.as_str()) {
            Some("deleted") => Ok(DestroyOutcome::Deleted),
            Some(_) | None => Ok(DestroyOutcome::NotFound),
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HostErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            error!(status = %status, message = %message, "Media host returned an error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = ?e, "Failed to parse media host response");
            GatewayError::Decode(e.to_string())
        })
    }
}

impl fmt::Debug for CloudinaryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryClient")
            .field("api_base", &self.api_base.as_str())
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &"[REDACTED]")
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}
