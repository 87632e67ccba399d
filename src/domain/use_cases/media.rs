use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::{
    constants::{
        IMAGE_UPLOAD_FAILED, VIDEO_DELETED, VIDEO_DELETE_FAILED, VIDEOS_LOAD_FAILED,
        VIDEO_UPLOAD_FAILED,
    },
    entities::media_asset::{
        DestroyOutcome, IncomingFile, MediaAsset, MessageResponse, ResourceType, StoragePolicy,
        UploadRequest, UploadedMedia,
    },
    errors::{AppError, GatewayError},
    repositories::{media_gateway::MediaGateway, video_documents::VideoDocumentStore},
    upload_limit::format_file_size,
};

pub struct MediaHandler {
    pub gateway: Arc<dyn MediaGateway>,
    pub documents: Arc<dyn VideoDocumentStore>,
    pub policy: StoragePolicy,
}

impl MediaHandler {
    pub fn new(
        gateway: Arc<dyn MediaGateway>,
        documents: Arc<dyn VideoDocumentStore>,
        policy: StoragePolicy,
    ) -> Self {
        MediaHandler { gateway, documents, policy }
    }

    /// Forwards a received file to the media host and returns its URL and id
    #[instrument(skip(self, file), fields(kind = %kind))]
    pub async fn upload(
        &self,
        kind: ResourceType,
        file: IncomingFile,
    ) -> Result<UploadedMedia, AppError> {
        let failure_message = match kind {
            ResourceType::Image => IMAGE_UPLOAD_FAILED,
            ResourceType::Video => VIDEO_UPLOAD_FAILED,
        };
        let mime_type = file.mime_type();
        let file_name = file
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| format!("upload.{}", kind));

        info!(
            original_name = %file_name,
            size = file.size(),
            mime_type = mime_type.as_deref().unwrap_or("unknown"),
            "📦 Upload request received"
        );
        info!(
            size = %format_file_size(file.size()),
            mime_type = mime_type.as_deref().unwrap_or("unknown"),
            "📝 File details"
        );

        let request = UploadRequest {
            resource_type: kind,
            file_name,
            content_type: mime_type,
            bytes: file.bytes,
            upload_preset: self.policy.preset_for(kind).to_string(),
            folder: Some(self.policy.folder_for(kind).to_string()),
        };

        let asset = self
            .gateway
            .upload(request)
            .await
            .map_err(|e| upload_failure(failure_message, e))?;

        let (format, bytes) = (asset.format.clone(), asset.bytes);
        let uploaded = UploadedMedia::try_from(asset)
            .map_err(|reason| upload_failure(failure_message, GatewayError::IncompleteResponse(reason)))?;

        info!(
            public_id = %uploaded.public_id,
            url = %uploaded.secure_url,
            format = %format,
            size = bytes,
            "✅ Upload successful"
        );

        Ok(uploaded)
    }

    /// Lists the videos stored under the configured prefix
    #[instrument(skip(self))]
    pub async fn list_videos(&self) -> Result<Vec<MediaAsset>, AppError> {
        let query = self.policy.video_listing();

        self.gateway.list(&query).await.map_err(|e| {
            error!(error = %e, prefix = %query.prefix, "Failed to list videos");
            AppError::remote(VIDEOS_LOAD_FAILED)
        })
    }

    /// Deletes a video from the media host and from the document store
    #[instrument(skip(self))]
    pub async fn delete_video(&self, public_id: &str) -> Result<MessageResponse, AppError> {
        if public_id.trim().is_empty() {
            error!("Refusing to delete a video without an identifier");
            return Err(AppError::remote(VIDEO_DELETE_FAILED));
        }

        let outcome = self
            .gateway
            .destroy(ResourceType::Video, public_id)
            .await
            .map_err(|e| {
                error!(error = %e, public_id, "Error deleting video from media host");
                AppError::remote(VIDEO_DELETE_FAILED)
            })?;

        if outcome == DestroyOutcome::NotFound {
            warn!(public_id, "Media host had no video with this id");
        }

        self.documents.delete_by_id(public_id).await.map_err(|e| {
            error!(error = %e, public_id, "Error deleting video document");
            AppError::remote(VIDEO_DELETE_FAILED)
        })?;

        info!(public_id, "Video deleted");
        Ok(MessageResponse {
            message: VIDEO_DELETED.to_string(),
        })
    }
}

fn upload_failure(message: &str, err: GatewayError) -> AppError {
    error!(error = %err, "❌ Upload error");
    AppError::remote_with_details(message, err)
}
