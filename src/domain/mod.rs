pub mod entities;
pub mod upload_limit;
pub mod use_cases;
