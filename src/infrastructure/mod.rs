pub mod cloudinary;
pub mod local_storage;
