use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::entities::media_asset::UploadedMedia;

/// Metadata kept on the client for every uploaded video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub public_id: String,
    pub created_at: DateTime<Utc>,
}

// ───── Input & Validation ───────────────────────────────────────────

/// Title and description as typed; blank-only text does not count as filled in.
#[derive(Debug, Clone, Default, Validate)]
pub struct VideoMetadata {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(custom(function = "validate_description"))]
    pub description: String,
}

impl VideoMetadata {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        VideoMetadata {
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn into_record(self, uploaded: &UploadedMedia) -> VideoRecord {
        VideoRecord {
            title: self.title,
            description: self.description,
            video_url: uploaded.secure_url.clone(),
            public_id: uploaded.public_id.clone(),
            created_at: Utc::now(),
        }
    }
}

fn required(value: &str, code: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(code).with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    required(title, "title_required", "El título del video es obligatorio")
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    required(description, "description_required", "La descripción del video es obligatoria")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_fail_validation() {
        let err = VideoMetadata::new(" \t", "algo").validate().unwrap_err();

        assert!(err.field_errors().contains_key("title"));
        assert!(!err.field_errors().contains_key("description"));
    }

    #[test]
    fn text_is_kept_as_typed() {
        let metadata = VideoMetadata::new("  Mi video ", "Línea uno\n");
        assert!(metadata.validate().is_ok());

        let record = metadata.into_record(&UploadedMedia {
            secure_url: "https://res.cloudinary.test/v.mp4".to_string(),
            public_id: "videos/v".to_string(),
        });

        assert_eq!(record.title, "  Mi video ");
        assert_eq!(record.description, "Línea uno\n");
    }
}
