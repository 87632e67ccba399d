use tracing::{error, info};

use crate::{
    client::video_library::VideoLibraryHandle,
    constants::{VIDEOS_LOAD_FAILED, VIDEO_DELETE_FAILED},
    entities::video_record::VideoRecord,
    errors::AppError,
};

pub const DELETE_PROMPT: &str = "¿Está seguro que desea eliminar este video?";
pub const EMPTY_MESSAGE: &str = "No hay videos disponibles";
pub const PLAYBACK_MIME: &str = "video/mp4";

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryState {
    Loading,
    Error(String),
    Empty,
    Populated(Vec<VideoRecord>),
}

/// One card of the grid: a player for the video plus its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCard {
    pub index: usize,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub mime_type: &'static str,
}

/// Asks the user to confirm a destructive action.
pub trait Confirmation {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirmation for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Grid of locally recorded videos.
///
/// Only curates the local list: removing a card never deletes the video from
/// the media host.
pub struct GalleryView {
    library: VideoLibraryHandle,
    state: GalleryState,
}

impl GalleryView {
    pub fn new(library: VideoLibraryHandle) -> Self {
        GalleryView {
            library,
            state: GalleryState::Loading,
        }
    }

    pub fn state(&self) -> &GalleryState {
        &self.state
    }

    pub fn records(&self) -> &[VideoRecord] {
        match &self.state {
            GalleryState::Populated(records) => records,
            _ => &[],
        }
    }

    pub fn cards(&self) -> Vec<VideoCard> {
        self.records()
            .iter()
            .enumerate()
            .map(|(index, record)| VideoCard {
                index,
                title: record.title.clone(),
                description: record.description.clone(),
                video_url: record.video_url.clone(),
                mime_type: PLAYBACK_MIME,
            })
            .collect()
    }

    /// Message to show instead of the grid, if any.
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            GalleryState::Loading => Some("Cargando videos..."),
            GalleryState::Error(message) => Some(message),
            GalleryState::Empty => Some(EMPTY_MESSAGE),
            GalleryState::Populated(_) => None,
        }
    }

    fn show(&mut self, records: Vec<VideoRecord>) {
        self.state = if records.is_empty() {
            GalleryState::Empty
        } else {
            GalleryState::Populated(records)
        };
    }

    pub async fn load(&mut self) -> &GalleryState {
        self.state = GalleryState::Loading;

        match self.library.list().await {
            Ok(records) => self.show(records),
            Err(e) => {
                error!(error = %e, "Failed to load videos");
                self.state = GalleryState::Error(VIDEOS_LOAD_FAILED.to_string());
            }
        }

        &self.state
    }

    /// Removes the card at `index` after confirmation. Returns whether anything was removed.
    pub async fn delete(
        &mut self,
        index: usize,
        confirmation: &impl Confirmation,
    ) -> Result<bool, AppError> {
        if !confirmation.confirm(DELETE_PROMPT) {
            return Ok(false);
        }

        match self.library.remove_at(index).await {
            Ok(remaining) => {
                info!(index, remaining = remaining.len(), "Video removed from gallery");
                self.show(remaining);
                Ok(true)
            }
            Err(e) => {
                error!(error = %e, index, "Failed to remove video");
                Err(AppError::Persistence(VIDEO_DELETE_FAILED.to_string()))
            }
        }
    }
}
