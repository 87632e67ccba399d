use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Local storage key holding the uploaded video records.
pub const VIDEOS_STORAGE_KEY: &str = "videos";

pub const MISSING_FILE: &str = "No se proporcionó ningún archivo";
pub const VIDEO_UPLOAD_FAILED: &str = "Error al subir el video";
pub const IMAGE_UPLOAD_FAILED: &str = "Error al subir la imagen";
pub const VIDEOS_LOAD_FAILED: &str = "Error al cargar los videos";
pub const VIDEO_DELETE_FAILED: &str = "Error al eliminar el video";
pub const VIDEO_DELETED: &str = "Video eliminado correctamente";
