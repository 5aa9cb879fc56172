//! Validate-then-decode pipeline for user supplied images.
//!
//! [`FileIngestor::ingest`] validates synchronously and, when the file
//! passes, spawns a task on the shell's single-threaded pool. The task runs
//! [`load`], which reads and decodes and returns a typed result; the task
//! then turns that result into exactly one notification. With a
//! [`FrameGate`] attached the task parks between read and decode until the
//! next frame, which is where a cancel request gets its chance.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use futures::executor::LocalSpawner;
use futures::task::LocalSpawnExt;
use uuid::Uuid;

use crate::cancellation::CancellationToken;
use crate::diagnostics;
use crate::error::{IngestError, IngestResult};
use crate::ingest::bitmap::DecodedImage;
use crate::ingest::request::IngestionRequest;
use crate::notifications::{NotificationOptions, Notifier};
use crate::settings::IngestSettings;
use crate::util::task::{FrameGate, yield_now};

pub const LOADED_MESSAGE: &str = "Image loaded successfully";

/// A dispatched ingestion. Dropping the handle does not cancel it.
#[derive(Debug, Clone)]
pub struct IngestHandle {
    request_id: Uuid,
    cancel: CancellationToken,
    finished: Rc<Cell<bool>>,
}

impl IngestHandle {
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Whether the task has run to completion, whatever the outcome.
    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Asks the task to stop at its next checkpoint. A cancelled ingestion
    /// delivers nothing and raises no notification.
    pub fn cancel(&self) -> bool {
        self.cancel.cancel()
    }
}

pub struct FileIngestor {
    settings: IngestSettings,
    notifier: Notifier,
    spawner: LocalSpawner,
    frames: Option<FrameGate>,
}

impl std::fmt::Debug for FileIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIngestor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl FileIngestor {
    pub fn new(settings: IngestSettings, notifier: Notifier, spawner: LocalSpawner) -> Self {
        Self {
            settings,
            notifier,
            spawner,
            frames: None,
        }
    }

    /// Paces dispatched tasks by `gate`: each one waits for the next frame
    /// between reading and decoding.
    #[must_use]
    pub fn with_frame_gate(mut self, gate: FrameGate) -> Self {
        self.frames = Some(gate);
        self
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Replaces the limits. Requests already dispatched were validated
    /// against the old limits and are not checked again.
    pub fn set_settings(&mut self, settings: IngestSettings) {
        self.settings = settings;
    }

    /// Checks the claimed type first, then the size.
    pub fn validate(&self, request: &IngestionRequest) -> IngestResult<()> {
        let allowed = &self.settings.allowed_types;
        if !allowed.iter().any(|t| t == request.media_type()) {
            return Err(IngestError::UnsupportedType {
                media_type: request.media_type().to_owned(),
                allowed: allowed.clone(),
            });
        }
        if request.size() > self.settings.max_file_size {
            return Err(IngestError::TooLarge {
                size: request.size(),
                limit: self.settings.max_file_size,
            });
        }
        Ok(())
    }

    /// Validates `request` and, if it passes, starts reading and decoding it.
    ///
    /// On success `on_loaded` runs exactly once, followed by a success
    /// notification. Any failure raises exactly one error notification and
    /// `on_loaded` is dropped unused. Returns `None` when nothing was
    /// dispatched.
    pub fn ingest<F>(&self, request: IngestionRequest, on_loaded: F) -> Option<IngestHandle>
    where
        F: FnOnce(DecodedImage) + 'static,
    {
        let log = diagnostics::get();

        if let Err(err) = self.validate(&request) {
            log.warn(format_args!("Rejected {}: {err}", request.name()));
            self.report(&err);
            return None;
        }

        let handle = IngestHandle {
            request_id: request.id(),
            cancel: CancellationToken::new(),
            finished: Rc::new(Cell::new(false)),
        };
        let cancel = handle.cancel.clone();
        let finished = handle.finished.clone();
        let notifier = self.notifier.clone();
        let name = request.name().to_owned();
        let pause = self.frames.as_ref().map(FrameGate::next_frame);

        let task = async move {
            let result = match pause {
                Some(pause) => load_after(request, cancel, pause).await,
                None => load(request, cancel).await,
            };
            match result {
                Ok(image) => {
                    on_loaded(image);
                    notifier.success(LOADED_MESSAGE, NotificationOptions::default());
                }
                Err(IngestError::Cancelled) => {
                    diagnostics::get().debug(format_args!("Ingestion of {name} cancelled"));
                }
                Err(err) => {
                    diagnostics::get().warn(format_args!("Could not ingest {name}: {err}"));
                    notifier.error(err.to_string(), NotificationOptions::default());
                }
            }
            finished.set(true);
        };

        if let Err(err) = self.spawner.spawn_local(task) {
            log.error_with_cause("Could not schedule image ingestion", &err);
            return None;
        }
        Some(handle)
    }

    /// Ingests the first request of a multi-file interaction and ignores the
    /// rest.
    pub fn ingest_first<I, F>(&self, requests: I, on_loaded: F) -> Option<IngestHandle>
    where
        I: IntoIterator<Item = IngestionRequest>,
        F: FnOnce(DecodedImage) + 'static,
    {
        let mut requests = requests.into_iter();
        let first = requests.next()?;
        let ignored = requests.count();
        if ignored > 0 {
            diagnostics::get().debug(format_args!("Ignoring {ignored} extra file(s)"));
        }
        self.ingest(first, on_loaded)
    }

    fn report(&self, err: &IngestError) {
        if let Some(message) = err.user_message() {
            self.notifier.error(message, NotificationOptions::default());
        }
    }
}

/// Reads and decodes one request, stopping early if `cancel` is triggered.
///
/// The decoded image keeps the source's natural size.
pub async fn load(request: IngestionRequest, cancel: CancellationToken) -> IngestResult<DecodedImage> {
    load_after(request, cancel, yield_now()).await
}

/// [`load`] with a caller-chosen suspension point between the read and the
/// decode.
pub async fn load_after<P>(request: IngestionRequest, cancel: CancellationToken, pause: P) -> IngestResult<DecodedImage>
where
    P: Future<Output = ()>,
{
    let log = diagnostics::get();
    let label = format!("decode {}", request.id());

    let bytes = request
        .into_source()
        .read_bytes()
        .await
        .map_err(IngestError::Read)?;
    checkpoint(&cancel)?;

    pause.await;
    checkpoint(&cancel)?;

    log.time(&label);
    let decoded = image::load_from_memory(&bytes).map_err(IngestError::Decode);
    log.time_end(&label);
    let image = DecodedImage::from_dynamic(decoded?);
    checkpoint(&cancel)?;

    log.debug(format_args!("Decoded image {}x{}", image.width(), image.height()));
    Ok(image)
}

fn checkpoint(cancel: &CancellationToken) -> IngestResult<()> {
    if cancel.is_cancelled() {
        Err(IngestError::Cancelled)
    } else {
        Ok(())
    }
}
