use crate::{entities::media_asset::ResourceType, upload_limit::format_file_size};

/// A file picked on the client, held in memory until it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// What the view shows for a selected file before it is uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_label: String,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = infer::get(&bytes).map(|kind| kind.mime_type().to_string());
        LocalFile {
            name: name.into(),
            content_type,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Kind of media the sniffed content type points at, if any.
    pub fn media_kind(&self) -> Option<ResourceType> {
        let content_type = self.content_type.as_deref()?;
        if content_type.starts_with("video/") {
            Some(ResourceType::Video)
        } else if content_type.starts_with("image/") {
            Some(ResourceType::Image)
        } else {
            None
        }
    }

    pub fn preview(&self) -> Preview {
        Preview {
            file_name: self.name.clone(),
            content_type: self.content_type.clone(),
            size_label: format_file_size(self.size()),
        }
    }
}
