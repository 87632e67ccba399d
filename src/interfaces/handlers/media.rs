use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse, Responder};
use tracing::{instrument, warn};

use crate::{
    constants::MISSING_FILE,
    entities::media_asset::{IncomingFile, ResourceType},
    errors::AppError,
    AppState,
};

#[derive(Debug, MultipartForm)]
pub struct UploadForm {
    #[multipart(rename = "file")]
    pub file: Option<TempFile>,
}

async fn read_upload(form: UploadForm) -> Result<IncomingFile, AppError> {
    let Some(upload) = form.file else {
        warn!("❌ No file provided");
        return Err(AppError::Validation(MISSING_FILE.to_string()));
    };

    let bytes = tokio::fs::read(upload.file.path())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read uploaded file: {e}")))?;

    Ok(IncomingFile {
        file_name: upload.file_name,
        content_type: upload.content_type.map(|mime| mime.to_string()),
        bytes,
    })
}

#[instrument(skip(state, form))]
pub async fn upload_video(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<impl Responder, AppError> {
    let file = read_upload(form.into_inner()).await?;

    let uploaded = state
        .media_handler
        .upload(ResourceType::Video, file)
        .await?;

    Ok(HttpResponse::Ok().json(uploaded))
}

#[instrument(skip(state, form))]
pub async fn upload_image(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<impl Responder, AppError> {
    let file = read_upload(form.into_inner()).await?;

    let uploaded = state
        .media_handler
        .upload(ResourceType::Image, file)
        .await?;

    Ok(HttpResponse::Ok().json(uploaded))
}

#[instrument(skip(state))]
pub async fn list_videos(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let videos = state.media_handler.list_videos().await?;
    Ok(HttpResponse::Ok().json(videos))
}

#[instrument(skip(state))]
pub async fn delete_video(
    state: web::Data<AppState>,
    public_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let response = state.media_handler.delete_video(&public_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip(state))]
pub async fn upload_limits(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.upload_limit.summary())
}
