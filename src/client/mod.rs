//! Client side of the gallery: upload and gallery screens as state machines,
//! the transports they upload through, and the locally persisted video list.

pub mod feedback;
pub mod gallery_view;
pub mod local_file;
pub mod transport;
pub mod upload_view;
pub mod video_library;
