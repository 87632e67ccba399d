use std::sync::Arc;

use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    client::{
        feedback::{Clipboard, Notifications},
        local_file::{LocalFile, Preview},
        transport::UploadTransport,
        video_library::VideoLibraryHandle,
    },
    entities::{
        media_asset::{ResourceType, UploadedMedia},
        video_record::VideoMetadata,
    },
    errors::AppError,
    upload_limit::UploadLimit,
};

const VIDEO_RETRY_MESSAGE: &str = "Error al subir el video. Por favor intente nuevamente.";
const VIDEO_NOT_SAVED: &str = "El video se subió pero no se pudo guardar en la galería local";
const UPLOAD_IN_PROGRESS: &str = "Espere a que termine la subida en curso";
const NO_UPLOAD_IN_PROGRESS: &str = "No hay ninguna subida en curso";

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    Idle,
    FileSelected { file: LocalFile, preview: Preview },
    Uploading { preview: Preview },
    Succeeded { uploaded: UploadedMedia, warning: Option<String> },
    Failed { message: String, file: Option<LocalFile> },
}

/// Work handed out by [`UploadView::begin_upload`] while the view is busy.
#[derive(Debug, Clone)]
pub struct UploadTicket {
    pub kind: ResourceType,
    pub file: LocalFile,
    id: u64,
    metadata: Option<VideoMetadata>,
}

struct ViewText {
    missing_file: &'static str,
    wrong_kind: &'static str,
    uploaded: &'static str,
    copied: &'static str,
}

static IMAGE_TEXT: ViewText = ViewText {
    missing_file: "Por favor seleccione una imagen",
    wrong_kind: "El archivo seleccionado no es una imagen",
    uploaded: "Imagen subida exitosamente",
    copied: "URL copiada al portapapeles",
};

static VIDEO_TEXT: ViewText = ViewText {
    missing_file: "Por favor seleccione un video",
    wrong_kind: "El archivo seleccionado no es un video",
    uploaded: "Video subido exitosamente",
    copied: "Link copiado al portapapeles",
};

/// Upload screen for one media kind: pick a file, send it, share the link.
pub struct UploadView {
    kind: ResourceType,
    transport: Arc<dyn UploadTransport>,
    clipboard: Arc<dyn Clipboard>,
    library: Option<VideoLibraryHandle>,
    limit: Option<UploadLimit>,
    metadata: VideoMetadata,
    state: UploadState,
    in_flight: Option<u64>,
    tickets_issued: u64,
    notifications: Notifications,
}

impl UploadView {
    pub fn image(transport: Arc<dyn UploadTransport>, clipboard: Arc<dyn Clipboard>) -> Self {
        Self::build(ResourceType::Image, transport, clipboard, None, None)
    }

    /// Video variant; successful uploads are recorded in `library`.
    pub fn video(
        transport: Arc<dyn UploadTransport>,
        clipboard: Arc<dyn Clipboard>,
        library: VideoLibraryHandle,
        limit: UploadLimit,
    ) -> Self {
        Self::build(ResourceType::Video, transport, clipboard, Some(library), Some(limit))
    }

    fn build(
        kind: ResourceType,
        transport: Arc<dyn UploadTransport>,
        clipboard: Arc<dyn Clipboard>,
        library: Option<VideoLibraryHandle>,
        limit: Option<UploadLimit>,
    ) -> Self {
        UploadView {
            kind,
            transport,
            clipboard,
            library,
            limit,
            metadata: VideoMetadata::default(),
            state: UploadState::Idle,
            in_flight: None,
            tickets_issued: 0,
            notifications: Notifications::default(),
        }
    }

    fn text(&self) -> &'static ViewText {
        match self.kind {
            ResourceType::Image => &IMAGE_TEXT,
            ResourceType::Video => &VIDEO_TEXT,
        }
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata = VideoMetadata::new(title, std::mem::take(&mut self.metadata.description));
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.metadata = VideoMetadata::new(std::mem::take(&mut self.metadata.title), description);
    }

    pub fn uploaded_url(&self) -> Option<&str> {
        match &self.state {
            UploadState::Succeeded { uploaded, .. } => Some(&uploaded.secure_url),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            UploadState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Transient confirmations currently on screen.
    pub fn notifications(&mut self) -> Vec<String> {
        self.notifications.active()
    }

    /// Whether the upload action is enabled.
    pub fn can_submit(&self) -> bool {
        match &self.state {
            UploadState::FileSelected { .. } => {
                self.kind != ResourceType::Video || self.metadata.validate().is_ok()
            }
            _ => false,
        }
    }

    fn check_size(&self, file: &LocalFile) -> Result<(), AppError> {
        match (&self.kind, &self.limit) {
            (ResourceType::Video, Some(limit)) => limit.check_video(file.size()),
            _ => Ok(()),
        }
    }

    /// Picks a local file. Files of the wrong kind and oversized videos are
    /// rejected without touching the network. Refused while an upload runs.
    pub fn select_file(&mut self, file: LocalFile) -> Result<(), AppError> {
        if matches!(self.state, UploadState::Uploading { .. }) {
            return Err(AppError::Validation(UPLOAD_IN_PROGRESS.to_string()));
        }

        if file.media_kind() != Some(self.kind) {
            warn!(
                file_name = %file.name,
                content_type = file.content_type.as_deref().unwrap_or("unknown"),
                "Selected file is not of the expected kind"
            );
            let err = AppError::Validation(self.text().wrong_kind.to_string());
            self.state = UploadState::Failed {
                message: err.to_string(),
                file: None,
            };
            return Err(err);
        }

        if let Err(err) = self.check_size(&file) {
            warn!(file_name = %file.name, size = file.size(), "Selected file exceeds the upload limit");
            self.state = UploadState::Failed {
                message: err.to_string(),
                file: None,
            };
            return Err(err);
        }

        let preview = file.preview();
        self.state = UploadState::FileSelected { file, preview };
        Ok(())
    }

    /// Moves a selected file into the uploading state.
    pub fn begin_upload(&mut self) -> Result<UploadTicket, AppError> {
        let file = match &self.state {
            UploadState::FileSelected { file, .. } => file.clone(),
            _ => return Err(AppError::Validation(self.text().missing_file.to_string())),
        };

        if let Err(err) = self.check_size(&file) {
            self.state = UploadState::Failed {
                message: err.to_string(),
                file: None,
            };
            return Err(err);
        }

        let metadata = if self.kind == ResourceType::Video {
            self.metadata.validate()?;
            Some(self.metadata.clone())
        } else {
            None
        };

        self.tickets_issued += 1;
        self.in_flight = Some(self.tickets_issued);
        self.state = UploadState::Uploading {
            preview: file.preview(),
        };

        Ok(UploadTicket {
            kind: self.kind,
            file,
            id: self.tickets_issued,
            metadata,
        })
    }

    /// Applies the transport's answer to a ticket from [`begin_upload`](Self::begin_upload).
    ///
    /// Only the ticket of the upload in flight is accepted; the state is left
    /// alone for any other.
    pub async fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        result: Result<UploadedMedia, AppError>,
    ) -> Result<UploadedMedia, AppError> {
        let current = matches!(self.state, UploadState::Uploading { .. })
            && self.in_flight == Some(ticket.id);
        if !current {
            warn!(ticket = ticket.id, "Ignoring answer for an upload that is not in flight");
            return Err(AppError::Validation(NO_UPLOAD_IN_PROGRESS.to_string()));
        }
        self.in_flight = None;

        let uploaded = match result {
            Ok(uploaded) => uploaded,
            Err(err) => {
                error!(error = %err, details = err.details().unwrap_or(""), "Upload failed");
                let message = match self.kind {
                    ResourceType::Image => err.to_string(),
                    ResourceType::Video => VIDEO_RETRY_MESSAGE.to_string(),
                };
                self.state = UploadState::Failed {
                    message,
                    file: Some(ticket.file),
                };
                return Err(err);
            }
        };

        let mut warning = None;
        if let (Some(library), Some(metadata)) = (&self.library, ticket.metadata) {
            match library.append(metadata.into_record(&uploaded)).await {
                Ok(count) => info!(count, public_id = %uploaded.public_id, "Video saved to gallery"),
                Err(e) => {
                    error!(error = %e, "Failed to save video record");
                    warning = Some(VIDEO_NOT_SAVED.to_string());
                }
            }
            self.metadata = VideoMetadata::default();
        }

        self.notifications.push(self.text().uploaded);
        self.state = UploadState::Succeeded {
            uploaded: uploaded.clone(),
            warning,
        };

        Ok(uploaded)
    }

    /// Full upload: validate, send through the transport, record the outcome.
    pub async fn submit(&mut self) -> Result<UploadedMedia, AppError> {
        let ticket = self.begin_upload()?;
        let result = self.transport.upload(ticket.kind, &ticket.file).await;
        self.finish_upload(ticket, result).await
    }

    /// After a failure, returns to the selected file so it can be sent again.
    pub fn retry(&mut self) -> Result<(), AppError> {
        match std::mem::replace(&mut self.state, UploadState::Idle) {
            UploadState::Failed { file: Some(file), .. } => {
                let preview = file.preview();
                self.state = UploadState::FileSelected { file, preview };
                Ok(())
            }
            other => {
                self.state = other;
                Err(AppError::Validation(self.text().missing_file.to_string()))
            }
        }
    }

    /// Puts the uploaded URL on the clipboard and confirms briefly.
    pub fn copy_url(&mut self) -> Result<(), AppError> {
        let url = self
            .uploaded_url()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("No hay ningún enlace para copiar".to_string()))?;

        self.clipboard.write_text(&url).inspect_err(|e| {
            error!(error = %e, "Failed to copy URL");
        })?;
        self.notifications.push(self.text().copied);
        Ok(())
    }
}
