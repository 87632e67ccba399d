use actix_web::web;

use crate::handlers::media;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/videos")
            .route(web::get().to(media::list_videos))
    )
    .service(
        web::resource("/videos/{public_id:.*}")
            .route(web::delete().to(media::delete_video))
    )
    .service(
        web::resource("/upload")
            .route(web::post().to(media::upload_video))
    )
    .service(
        web::resource("/upload/limits")
            .route(web::get().to(media::upload_limits))
    )
    .service(
        web::resource("/images/upload")
            .route(web::post().to(media::upload_image))
    );
}
