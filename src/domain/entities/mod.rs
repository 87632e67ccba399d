pub mod media_asset;
pub mod video_record;
