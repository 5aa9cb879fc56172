//! Turning a user supplied file into a decoded bitmap.

pub mod drop_zone;
mod bitmap;
mod ingestor;
mod request;

pub use drop_zone::{DragEvent, DragState, DropZone, EventDisposition, EventLevel};
pub use bitmap::DecodedImage;
pub use ingestor::{FileIngestor, IngestHandle, LOADED_MESSAGE, load, load_after};
#[cfg(not(target_arch = "wasm32"))]
pub use request::PathSource;
pub use request::{ByteSource, IngestionRequest, MemorySource, media_type_from_name};
