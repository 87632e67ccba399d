use async_trait::async_trait;

use crate::{
    cloudinary::CloudinaryClient,
    entities::media_asset::{DestroyOutcome, ListQuery, MediaAsset, ResourceType, UploadRequest},
    errors::GatewayError,
};

#[async_trait]
pub trait MediaGateway: Send + Sync {
    /// Stores a file and returns the host's description of it
    async fn upload(&self, request: UploadRequest) -> Result<MediaAsset, GatewayError>;

    /// Lists stored assets matching the query
    async fn list(&self, query: &ListQuery) -> Result<Vec<MediaAsset>, GatewayError>;

    /// Removes an asset by its host identifier
    async fn destroy(
        &self,
        resource_type: ResourceType,
        public_id: &str,
    ) -> Result<DestroyOutcome, GatewayError>;
}

#[async_trait]
impl MediaGateway for CloudinaryClient {
    async fn upload(&self, request: UploadRequest) -> Result<MediaAsset, GatewayError> {
        self.upload_asset(request).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<MediaAsset>, GatewayError> {
        self.list_assets(query).await
    }

    async fn destroy(
        &self,
        resource_type: ResourceType,
        public_id: &str,
    ) -> Result<DestroyOutcome, GatewayError> {
        self.destroy_asset(resource_type, public_id).await
    }
}
