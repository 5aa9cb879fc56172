use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;
use std::sync::Arc;

use futures::FutureExt;
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use paint_by_numbers::cancellation::CancellationToken;
use paint_by_numbers::error::IngestErrorKind;
use paint_by_numbers::ingest::{self, ByteSource, DecodedImage, FileIngestor, IngestionRequest, MemorySource};
use paint_by_numbers::notifications::{NotificationCenter, Severity};
use paint_by_numbers::settings::IngestSettings;
use paint_by_numbers::util::task::FrameGate;
use paint_by_numbers::util::time::ManualClock;

/// Encodes a blank PNG of the given size.
fn png_bytes(width: u32, height: u32) -> Arc<[u8]> {
    let image = image::RgbaImage::new(width, height);
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, image::ImageFormat::Png).unwrap();
    Arc::from(out.into_inner())
}

fn png_request(name: &str, width: u32, height: u32) -> IngestionRequest {
    IngestionRequest::from_bytes(name, "image/png", png_bytes(width, height))
}

struct FailingSource;

impl ByteSource for FailingSource {
    fn read_bytes(self: Box<Self>) -> LocalBoxFuture<'static, std::io::Result<Vec<u8>>> {
        async { Err::<Vec<u8>, _>(std::io::Error::other("disk unplugged")) }.boxed_local()
    }
}

struct Harness {
    pool: LocalPool,
    center: NotificationCenter,
    ingestor: FileIngestor,
    loaded: Rc<RefCell<Vec<DecodedImage>>>,
}

impl Harness {
    fn new(settings: IngestSettings) -> Self {
        let pool = LocalPool::new();
        let center = NotificationCenter::new(ManualClock::new());
        let ingestor = FileIngestor::new(settings, center.notifier(), pool.spawner());
        Self {
            pool,
            center,
            ingestor,
            loaded: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// A harness whose tasks wait for `FrameGate::advance` before decoding.
    fn paced(settings: IngestSettings) -> (Self, FrameGate) {
        let gate = FrameGate::new();
        let pool = LocalPool::new();
        let center = NotificationCenter::new(ManualClock::new());
        let ingestor =
            FileIngestor::new(settings, center.notifier(), pool.spawner()).with_frame_gate(gate.clone());
        let harness = Self {
            pool,
            center,
            ingestor,
            loaded: Rc::new(RefCell::new(Vec::new())),
        };
        (harness, gate)
    }

    fn on_loaded(&self) -> impl FnOnce(DecodedImage) + 'static {
        let loaded = self.loaded.clone();
        move |image| loaded.borrow_mut().push(image)
    }

    /// Runs every pending task and applies the notifications they raised.
    fn settle(&mut self) {
        self.pool.run_until_stalled();
        self.center.poll();
    }

    fn notifications(&self) -> Vec<(Severity, String)> {
        self.center
            .active()
            .map(|n| (n.severity(), n.message().to_owned()))
            .collect()
    }

    fn loaded_sizes(&self) -> Vec<(u32, u32)> {
        self.loaded
            .borrow()
            .iter()
            .map(|image| (image.width(), image.height()))
            .collect()
    }
}

#[test]
fn test_disallowed_type_raises_one_error() {
    let mut h = Harness::new(IngestSettings::default());
    let request = IngestionRequest::from_bytes("notes.txt", "text/plain", Arc::from(b"hello".to_vec()));

    let handle = h.ingestor.ingest(request, h.on_loaded());
    h.settle();

    assert!(handle.is_none());
    assert!(h.loaded.borrow().is_empty());
    assert_eq!(
        h.notifications(),
        vec![(
            Severity::Error,
            "Invalid file type. Allowed types: image/png, image/jpeg, image/jpg, image/gif, image/webp".to_owned()
        )]
    );
}

#[test]
fn test_oversized_file_cites_limit_in_mib() {
    let settings = IngestSettings {
        max_file_size: 1_572_864, // 1.5 MiB
        ..IngestSettings::default()
    };
    let mut h = Harness::new(settings);
    // Claims to be bigger than the bytes actually behind it; only the claim is checked.
    let request = IngestionRequest::new("huge.png", "image/png", 2_000_000, MemorySource(png_bytes(2, 2)));

    let handle = h.ingestor.ingest(request, h.on_loaded());
    h.settle();

    assert!(handle.is_none());
    assert!(h.loaded.borrow().is_empty());
    assert_eq!(
        h.notifications(),
        vec![(Severity::Error, "File too large. Maximum size: 1.50MB".to_owned())]
    );
}

#[test]
fn test_default_limit_is_ten_mib() {
    let mut h = Harness::new(IngestSettings::default());
    let request = IngestionRequest::new("huge.png", "image/png", 10 * 1024 * 1024 + 1, MemorySource(png_bytes(1, 1)));

    h.ingestor.ingest(request, h.on_loaded());
    h.settle();

    assert_eq!(
        h.notifications(),
        vec![(Severity::Error, "File too large. Maximum size: 10.00MB".to_owned())]
    );
}

#[test]
fn test_file_at_exact_limit_is_accepted() {
    let bytes = png_bytes(3, 3);
    let settings = IngestSettings {
        max_file_size: bytes.len() as u64,
        ..IngestSettings::default()
    };
    let mut h = Harness::new(settings);

    h.ingestor.ingest(IngestionRequest::from_bytes("edge.png", "image/png", bytes), h.on_loaded());
    h.settle();

    assert_eq!(h.loaded_sizes(), vec![(3, 3)]);
}

#[test]
fn test_validation_happens_before_any_task_runs() {
    let mut h = Harness::new(IngestSettings::default());
    h.ingestor.ingest(
        IngestionRequest::from_bytes("a.bmp", "image/bmp", png_bytes(1, 1)),
        h.on_loaded(),
    );

    // No task was spawned, so the error is already queued without running the pool.
    h.center.poll();
    assert_eq!(h.notifications().len(), 1);
    assert_eq!(h.notifications()[0].0, Severity::Error);
}

#[test]
fn test_valid_file_delivers_natural_size_then_success() {
    let mut h = Harness::new(IngestSettings::default());

    let handle = h.ingestor.ingest(png_request("cat.png", 13, 7), h.on_loaded());
    assert!(handle.is_some());

    // Nothing is delivered until the pool runs.
    assert!(h.loaded.borrow().is_empty());

    h.settle();
    assert_eq!(h.loaded_sizes(), vec![(13, 7)]);
    assert_eq!(
        h.notifications(),
        vec![(Severity::Success, "Image loaded successfully".to_owned())]
    );
    assert!(handle.unwrap().is_finished());
}

#[test]
fn test_only_first_of_many_files_is_processed() {
    let mut h = Harness::new(IngestSettings::default());
    let requests = vec![
        png_request("first.png", 4, 5),
        png_request("second.png", 8, 9),
        IngestionRequest::from_bytes("third.txt", "text/plain", Arc::from(Vec::new())),
    ];

    h.ingestor.ingest_first(requests, h.on_loaded());
    h.settle();

    assert_eq!(h.loaded_sizes(), vec![(4, 5)]);
    assert_eq!(h.notifications().len(), 1);
    assert_eq!(h.notifications()[0].0, Severity::Success);
}

#[test]
fn test_empty_selection_does_nothing() {
    let mut h = Harness::new(IngestSettings::default());
    assert!(h.ingestor.ingest_first(Vec::new(), h.on_loaded()).is_none());
    h.settle();
    assert!(h.center.is_empty());
}

#[test]
fn test_corrupt_image_raises_decode_error() {
    let mut h = Harness::new(IngestSettings::default());
    let request = IngestionRequest::from_bytes("broken.png", "image/png", Arc::from(b"not a png".to_vec()));

    h.ingestor.ingest(request, h.on_loaded());
    h.settle();

    assert!(h.loaded.borrow().is_empty());
    assert_eq!(
        h.notifications(),
        vec![(Severity::Error, "Failed to load image".to_owned())]
    );
}

#[test]
fn test_read_failure_raises_read_error() {
    let mut h = Harness::new(IngestSettings::default());
    let request = IngestionRequest::new("gone.png", "image/png", 100, FailingSource);

    h.ingestor.ingest(request, h.on_loaded());
    h.settle();

    assert!(h.loaded.borrow().is_empty());
    assert_eq!(
        h.notifications(),
        vec![(Severity::Error, "Error reading file".to_owned())]
    );
}

#[test]
fn test_cancelled_ingestion_is_silent() {
    let mut h = Harness::new(IngestSettings::default());

    let handle = h.ingestor.ingest(png_request("slow.png", 6, 6), h.on_loaded()).unwrap();
    assert!(handle.cancel());
    h.settle();

    assert!(h.loaded.borrow().is_empty());
    assert!(h.center.is_empty());
    assert!(handle.is_finished());
    assert!(handle.token().is_cancelled());
}

#[test]
fn test_concurrent_ingestions_are_independent() {
    let mut h = Harness::new(IngestSettings::default());

    h.ingestor.ingest(png_request("a.png", 2, 3), h.on_loaded());
    h.ingestor.ingest(
        IngestionRequest::from_bytes("b.png", "image/png", Arc::from(b"junk".to_vec())),
        h.on_loaded(),
    );
    h.ingestor.ingest(png_request("c.png", 4, 1), h.on_loaded());
    h.settle();

    let mut sizes = h.loaded_sizes();
    sizes.sort();
    assert_eq!(sizes, vec![(2, 3), (4, 1)]);

    let severities: Vec<_> = h.notifications().into_iter().map(|(s, _)| s).collect();
    assert_eq!(severities.iter().filter(|s| **s == Severity::Success).count(), 2);
    assert_eq!(severities.iter().filter(|s| **s == Severity::Error).count(), 1);
}

#[test]
fn test_settings_change_does_not_revalidate_in_flight_request() {
    let mut h = Harness::new(IngestSettings::default());
    h.ingestor.ingest(png_request("ok.png", 5, 5), h.on_loaded());

    h.ingestor.set_settings(IngestSettings {
        max_file_size: 1,
        allowed_types: Vec::new(),
    });
    h.settle();

    assert_eq!(h.loaded_sizes(), vec![(5, 5)]);
}

#[test]
fn test_load_returns_typed_failures() {
    let mut pool = LocalPool::new();

    let corrupt = IngestionRequest::from_bytes("x.png", "image/png", Arc::from(vec![0u8; 16]));
    let err = pool
        .run_until(ingest::load(corrupt, CancellationToken::new()))
        .unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::Decode);

    let unreadable = IngestionRequest::new("y.png", "image/png", 1, FailingSource);
    let err = pool
        .run_until(ingest::load(unreadable, CancellationToken::new()))
        .unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::Read);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = pool
        .run_until(ingest::load(png_request("z.png", 1, 1), cancel))
        .unwrap_err();
    assert_eq!(err.kind(), IngestErrorKind::Cancelled);
}

#[test]
fn test_load_keeps_pixels_untouched() {
    let mut source = image::RgbaImage::new(3, 2);
    source.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    source.write_to(&mut out, image::ImageFormat::Png).unwrap();

    let request = IngestionRequest::from_bytes("px.png", "image/png", Arc::from(out.into_inner()));
    let decoded = LocalPool::new()
        .run_until(ingest::load(request, CancellationToken::new()))
        .unwrap();

    assert_eq!((decoded.width(), decoded.height()), (3, 2));
    assert_eq!(decoded.pixels(), &source);
}

#[test]
fn test_paced_ingestion_stays_in_flight_until_next_frame() {
    let (mut h, gate) = Harness::paced(IngestSettings::default());
    let handle = h.ingestor.ingest(png_request("frame.png", 9, 4), h.on_loaded()).unwrap();

    h.settle();
    assert!(!handle.is_finished());
    assert!(h.loaded.borrow().is_empty());
    assert!(h.center.is_empty());

    gate.advance();
    h.settle();
    assert!(handle.is_finished());
    assert_eq!(h.loaded_sizes(), vec![(9, 4)]);
    assert_eq!(
        h.notifications(),
        vec![(Severity::Success, "Image loaded successfully".to_owned())]
    );
}

#[test]
fn test_cancel_between_frames_stops_before_decode() {
    let (mut h, gate) = Harness::paced(IngestSettings::default());
    let handle = h.ingestor.ingest(png_request("abandon.png", 5, 5), h.on_loaded()).unwrap();

    // The read has happened; the task is parked waiting for the next frame.
    h.settle();
    assert!(!handle.is_finished());
    assert!(handle.cancel());

    gate.advance();
    h.settle();
    assert!(handle.is_finished());
    assert!(h.loaded.borrow().is_empty());
    assert!(h.center.is_empty());
}
