use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{errors::AppError, upload_limit::UploadLimit};

/// Upload bodies larger than the configured limit are refused with 413.
pub fn config_routes(cfg: &mut web::ServiceConfig, limit: UploadLimit) {
    let max_bytes = usize::try_from(limit.max_bytes()).unwrap_or(usize::MAX);

    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(max_bytes)
            .memory_limit(max_bytes.min(2 * 1024 * 1024))
            .error_handler(|err, _req| {
                tracing::warn!(error = %err, "Rejected multipart upload");
                AppError::from(err).into()
            }),
    );
}
