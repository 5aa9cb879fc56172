#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod cancellation;
pub mod diagnostics;
pub mod error;
pub mod file_handler;
pub mod id_generator;
pub mod ingest;
pub mod notifications;
pub mod settings;
pub mod util;

pub use app::PaintApp;
pub use cancellation::{CancellationState, CancellationToken};
pub use diagnostics::{BuildMode, DiagnosticsLog};
pub use error::{IngestError, IngestErrorKind};
pub use ingest::{DecodedImage, FileIngestor, IngestionRequest};
pub use notifications::{NotificationCenter, NotificationOptions, Notifier, Severity};
pub use settings::Settings;
