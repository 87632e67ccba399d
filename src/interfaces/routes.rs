use actix_web::web;

use crate::{
    handlers::{home::home, system::health_check},
    upload_limit::UploadLimit,
};

mod media;
mod multipart;

pub fn configure_routes(cfg: &mut web::ServiceConfig, limit: UploadLimit) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.configure(media::config_routes);

    cfg.configure(|cfg| multipart::config_routes(cfg, limit));
}
