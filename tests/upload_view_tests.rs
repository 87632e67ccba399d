use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use media_gallery_backend::{
    client::{
        feedback::{Clipboard, MemoryClipboard},
        local_file::LocalFile,
        transport::UploadTransport,
        upload_view::{UploadState, UploadView},
        video_library::{VideoLibrary, VideoLibraryHandle},
    },
    entities::media_asset::{ResourceType, UploadedMedia},
    errors::{AppError, StoreError},
    local_storage::{KeyValueStore, MemoryKeyValueStore},
    upload_limit::UploadLimit,
};
use parking_lot::Mutex;
use tokio::time::{advance, Duration};

/// Transport double answering from a queue of canned results.
struct ScriptedTransport {
    calls: AtomicUsize,
    answers: Mutex<Vec<Result<UploadedMedia, AppError>>>,
}

impl ScriptedTransport {
    fn answering(answers: Vec<Result<UploadedMedia, AppError>>) -> Arc<Self> {
        Arc::new(ScriptedTransport {
            calls: AtomicUsize::new(0),
            answers: Mutex::new(answers.into_iter().rev().collect()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UploadTransport for ScriptedTransport {
    async fn upload(&self, _kind: ResourceType, _file: &LocalFile) -> Result<UploadedMedia, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .pop()
            .unwrap_or_else(|| Err(AppError::remote("no scripted answer")))
    }
}

struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
        Err(StoreError::Write("storage is full".to_string()))
    }
}

fn uploaded() -> UploadedMedia {
    UploadedMedia {
        secure_url: "https://res.cloudinary.test/demo/video/upload/videos/abc.mp4".to_string(),
        public_id: "videos/abc".to_string(),
    }
}

fn clip(size: usize) -> LocalFile {
    LocalFile::new("clip.mp4", vec![0u8; size]).with_content_type("video/mp4")
}

fn photo() -> LocalFile {
    LocalFile::new("photo.png", vec![1u8; 32]).with_content_type("image/png")
}

fn video_view(
    transport: Arc<ScriptedTransport>,
    limit: UploadLimit,
) -> (UploadView, VideoLibraryHandle, Arc<MemoryClipboard>) {
    let library = VideoLibrary::spawn(MemoryKeyValueStore::new());
    let clipboard = Arc::new(MemoryClipboard::new());
    let view = UploadView::video(transport, clipboard.clone(), library.clone(), limit);
    (view, library, clipboard)
}

#[tokio::test]
async fn oversized_video_is_rejected_before_any_upload() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let (mut view, _library, _clipboard) = video_view(transport.clone(), UploadLimit::from_kilobytes(4));

    let err = view.select_file(clip(5 * 1024)).unwrap_err();

    assert_eq!(
        err.to_string(),
        "El video excede el límite de 4KB. Tamaño actual: 5.00KB"
    );
    assert!(matches!(view.state(), UploadState::Failed { file: None, .. }));
    assert!(view.submit().await.is_err());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn submit_without_file_asks_for_one() {
    let transport = ScriptedTransport::answering(vec![]);
    let (mut view, _library, _clipboard) = video_view(transport.clone(), UploadLimit::default());

    let err = view.submit().await.unwrap_err();

    assert_eq!(err.to_string(), "Por favor seleccione un video");
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn video_needs_title_and_description() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let (mut view, _library, _clipboard) = video_view(transport.clone(), UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("   ");

    assert!(!view.can_submit());
    let err = view.submit().await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("título"));
    assert_eq!(transport.calls(), 0);
    assert!(matches!(view.state(), UploadState::FileSelected { .. }));
}

#[tokio::test]
async fn successful_video_upload_is_recorded_locally() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let (mut view, library, _clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("Mi video");
    view.set_description("Una descripción");
    assert!(view.can_submit());

    let result = view.submit().await.unwrap();

    assert_eq!(result, uploaded());
    assert_eq!(view.uploaded_url(), Some(uploaded().secure_url.as_str()));
    assert!(view.metadata().title.is_empty());

    let records = library.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Mi video");
    assert_eq!(records[0].description, "Una descripción");
    assert_eq!(records[0].video_url, uploaded().secure_url);
    assert_eq!(records[0].public_id, "videos/abc");
}

#[tokio::test]
async fn view_is_busy_while_uploading() {
    let transport = ScriptedTransport::answering(vec![]);
    let (mut view, _library, _clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");

    let ticket = view.begin_upload().unwrap();

    assert!(matches!(view.state(), UploadState::Uploading { .. }));
    assert!(!view.can_submit());

    view.finish_upload(ticket, Ok(uploaded())).await.unwrap();
    assert!(matches!(view.state(), UploadState::Succeeded { warning: None, .. }));
}

#[tokio::test]
async fn failure_keeps_file_for_retry() {
    let transport = ScriptedTransport::answering(vec![
        Err(AppError::remote_with_details("Error al subir el video", "timeout")),
        Ok(uploaded()),
    ]);
    let (mut view, library, _clipboard) = video_view(transport.clone(), UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");

    assert!(view.submit().await.is_err());
    assert_eq!(
        view.error_message(),
        Some("Error al subir el video. Por favor intente nuevamente.")
    );
    assert!(library.list().await.unwrap().is_empty());

    view.retry().unwrap();
    assert!(matches!(view.state(), UploadState::FileSelected { file, .. } if file.name == "clip.mp4"));

    view.submit().await.unwrap();
    assert_eq!(transport.calls(), 2);
    assert_eq!(library.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn image_failure_shows_underlying_message() {
    let transport = ScriptedTransport::answering(vec![Err(AppError::remote("Error al subir la imagen"))]);
    let mut view = UploadView::image(transport, Arc::new(MemoryClipboard::new()));
    view.select_file(photo()).unwrap();

    assert!(view.submit().await.is_err());

    assert_eq!(view.error_message(), Some("Error al subir la imagen"));
}

#[tokio::test]
async fn persistence_failure_after_upload_is_a_warning() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let library = VideoLibrary::spawn(ReadOnlyStore);
    let mut view = UploadView::video(
        transport,
        Arc::new(MemoryClipboard::new()),
        library,
        UploadLimit::default(),
    );
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");

    assert!(view.submit().await.is_ok());

    match view.state() {
        UploadState::Succeeded { warning, uploaded: media } => {
            assert!(warning.is_some());
            assert_eq!(media.public_id, "videos/abc");
        }
        other => panic!("unexpected state {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn copied_link_notification_disappears_after_two_seconds() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let (mut view, _library, clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");
    view.submit().await.unwrap();

    advance(Duration::from_millis(2100)).await;
    assert!(view.notifications().is_empty());

    view.copy_url().unwrap();

    assert_eq!(clipboard.read_text(), Some(uploaded().secure_url));
    assert_eq!(view.notifications(), vec!["Link copiado al portapapeles".to_string()]);

    advance(Duration::from_millis(1900)).await;
    assert_eq!(view.notifications().len(), 1);

    advance(Duration::from_millis(200)).await;
    assert!(view.notifications().is_empty());
}

#[tokio::test]
async fn image_view_copies_with_its_own_message() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let mut view = UploadView::image(transport, Arc::new(MemoryClipboard::new()));

    assert!(view.copy_url().is_err());

    view.select_file(photo()).unwrap();
    view.submit().await.unwrap();
    view.copy_url().unwrap();

    assert_eq!(
        view.notifications(),
        vec![
            "Imagen subida exitosamente".to_string(),
            "URL copiada al portapapeles".to_string()
        ]
    );
}

#[tokio::test]
async fn image_view_refuses_a_pdf() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let mut view = UploadView::image(transport.clone(), Arc::new(MemoryClipboard::new()));
    let pdf = LocalFile::new("doc.pdf", b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n1 0 obj\n".to_vec());

    let err = view.select_file(pdf).unwrap_err();

    assert_eq!(err.to_string(), "El archivo seleccionado no es una imagen");
    assert!(matches!(view.state(), UploadState::Failed { file: None, .. }));
    assert!(view.submit().await.is_err());
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn video_view_refuses_an_image() {
    let transport = ScriptedTransport::answering(vec![]);
    let (mut view, _library, _clipboard) = video_view(transport, UploadLimit::default());

    let err = view.select_file(photo()).unwrap_err();

    assert_eq!(err.to_string(), "El archivo seleccionado no es un video");
    assert!(!view.can_submit());
}

#[tokio::test]
async fn file_cannot_be_swapped_during_upload() {
    let transport = ScriptedTransport::answering(vec![]);
    let (mut view, library, _clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");
    let ticket = view.begin_upload().unwrap();

    let other = LocalFile::new("b.mp4", vec![0u8; 32]).with_content_type("video/mp4");
    assert!(view.select_file(other).is_err());
    assert!(matches!(view.state(), UploadState::Uploading { .. }));

    view.finish_upload(ticket, Ok(uploaded())).await.unwrap();
    let records = library.list().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn stale_ticket_does_not_overwrite_state() {
    let transport = ScriptedTransport::answering(vec![]);
    let (mut view, library, _clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");
    let ticket = view.begin_upload().unwrap();
    let stale = ticket.clone();
    view.finish_upload(ticket, Ok(uploaded())).await.unwrap();

    let err = view
        .finish_upload(stale, Err(AppError::remote("Error al subir el video")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(matches!(view.state(), UploadState::Succeeded { .. }));
    assert_eq!(library.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn earlier_ticket_is_ignored_once_a_new_upload_starts() {
    let transport = ScriptedTransport::answering(vec![]);
    let (mut view, _library, _clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("t");
    view.set_description("d");
    let first = view.begin_upload().unwrap();
    view.finish_upload(first.clone(), Err(AppError::remote("Error al subir el video")))
        .await
        .unwrap_err();
    view.retry().unwrap();
    let _second = view.begin_upload().unwrap();

    assert!(view.finish_upload(first, Ok(uploaded())).await.is_err());
    assert!(matches!(view.state(), UploadState::Uploading { .. }));
}

#[tokio::test]
async fn title_and_description_are_saved_as_typed() {
    let transport = ScriptedTransport::answering(vec![Ok(uploaded())]);
    let (mut view, library, _clipboard) = video_view(transport, UploadLimit::default());
    view.select_file(clip(64)).unwrap();
    view.set_title("  Mi video ");
    view.set_description(" Una descripción\n");

    view.submit().await.unwrap();

    let records = library.list().await.unwrap();
    assert_eq!(records[0].title, "  Mi video ");
    assert_eq!(records[0].description, " Una descripción\n");
}
