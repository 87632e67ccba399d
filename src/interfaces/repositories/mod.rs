pub mod media_gateway;
pub mod video_documents;
