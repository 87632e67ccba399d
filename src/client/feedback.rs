use parking_lot::Mutex;
use tokio::time::{Duration, Instant};

use crate::errors::AppError;

/// How long a transient confirmation stays on screen.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(2);

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), AppError>;

    fn read_text(&self) -> Option<String>;
}

/// Process-local clipboard.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<(), AppError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }

    fn read_text(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    shown_at: Instant,
}

/// Transient messages that dismiss themselves after [`NOTIFICATION_TTL`].
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(Notification {
            message: message.into(),
            shown_at: Instant::now(),
        });
    }

    /// Messages still on screen; expired ones are dropped.
    pub fn active(&mut self) -> Vec<String> {
        let now = Instant::now();
        self.items
            .retain(|n| now.saturating_duration_since(n.shown_at) < NOTIFICATION_TTL);
        self.items.iter().map(|n| n.message.clone()).collect()
    }
}
