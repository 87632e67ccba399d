use actix_web::{get, web, HttpResponse, Responder};

use crate::AppState;

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Media gallery API",
        "status": "Ok",
        "name": state.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/videos", "/upload", "/images/upload", "/upload/limits", "/health"]
    }))
}
