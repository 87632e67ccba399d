use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

use crate::{
    constants::VIDEOS_STORAGE_KEY,
    entities::video_record::VideoRecord,
    errors::StoreError,
    local_storage::KeyValueStore,
};

const INBOX_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

enum Command {
    List { reply: Reply<Vec<VideoRecord>> },
    Append { record: VideoRecord, reply: Reply<usize> },
    RemoveAt { index: usize, reply: Reply<Vec<VideoRecord>> },
}

/// Owns the persisted video sequence.
///
/// Every read-modify-write runs inside this single task, so concurrent callers
/// holding cloned handles can never overwrite each other's changes.
pub struct VideoLibrary<S> {
    store: S,
    key: String,
    inbox: mpsc::Receiver<Command>,
}

impl<S> VideoLibrary<S>
where
    S: KeyValueStore + 'static,
{
    /// Starts the owning task under the default `videos` key.
    pub fn spawn(store: S) -> VideoLibraryHandle {
        Self::spawn_with_key(store, VIDEOS_STORAGE_KEY)
    }

    pub fn spawn_with_key(store: S, key: impl Into<String>) -> VideoLibraryHandle {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let library = VideoLibrary {
            store,
            key: key.into(),
            inbox,
        };
        tokio::spawn(library.run());

        VideoLibraryHandle { sender }
    }

    async fn run(mut self) {
        while let Some(command) = self.inbox.recv().await {
            match command {
                Command::List { reply } => {
                    let _ = reply.send(self.read().await);
                }
                Command::Append { record, reply } => {
                    let _ = reply.send(self.append(record).await);
                }
                Command::RemoveAt { index, reply } => {
                    let _ = reply.send(self.remove_at(index).await);
                }
            }
        }
        debug!(key = %self.key, "Video library stopped");
    }

    async fn read(&self) -> Result<Vec<VideoRecord>, StoreError> {
        match self.store.get(&self.key).await? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                error!(error = %e, key = %self.key, "Stored videos are not valid JSON");
                StoreError::Corrupt(e.to_string())
            }),
        }
    }

    async fn write(&self, records: &[VideoRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records).map_err(|e| StoreError::Write(e.to_string()))?;
        self.store.set(&self.key, raw).await
    }

    async fn append(&self, record: VideoRecord) -> Result<usize, StoreError> {
        let mut records = self.read().await?;
        records.push(record);
        self.write(&records).await?;
        Ok(records.len())
    }

    async fn remove_at(&self, index: usize) -> Result<Vec<VideoRecord>, StoreError> {
        let mut records = self.read().await?;
        if index >= records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: records.len(),
            });
        }
        records.remove(index);
        self.write(&records).await?;
        Ok(records)
    }
}

/// Cheap, cloneable access to a running [`VideoLibrary`].
#[derive(Clone)]
pub struct VideoLibraryHandle {
    sender: mpsc::Sender<Command>,
}

impl VideoLibraryHandle {
    /// All records in insertion order.
    pub async fn list(&self) -> Result<Vec<VideoRecord>, StoreError> {
        self.request(|reply| Command::List { reply }).await
    }

    /// Appends a record and returns the new length.
    pub async fn append(&self, record: VideoRecord) -> Result<usize, StoreError> {
        self.request(|reply| Command::Append { record, reply }).await
    }

    /// Removes the record at `index` and returns the remaining records.
    pub async fn remove_at(&self, index: usize) -> Result<Vec<VideoRecord>, StoreError> {
        self.request(|reply| Command::RemoveAt { index, reply }).await
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, StoreError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(command(reply))
            .await
            .map_err(|_| StoreError::Closed)?;
        response.await.map_err(|_| StoreError::Closed)?
    }
}
