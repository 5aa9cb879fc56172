use std::path::Path;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use uuid::Uuid;

/// Opaque capability that produces the raw bytes of a file on request.
pub trait ByteSource {
    fn read_bytes(self: Box<Self>) -> LocalBoxFuture<'static, std::io::Result<Vec<u8>>>;
}

/// Bytes the platform already handed over (web drops, tests).
#[derive(Debug, Clone)]
pub struct MemorySource(pub Arc<[u8]>);

impl ByteSource for MemorySource {
    fn read_bytes(self: Box<Self>) -> LocalBoxFuture<'static, std::io::Result<Vec<u8>>> {
        async move { Ok::<_, std::io::Error>(self.0.to_vec()) }.boxed_local()
    }
}

/// A file on the local filesystem, read when the task runs.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct PathSource(pub std::path::PathBuf);

#[cfg(not(target_arch = "wasm32"))]
impl ByteSource for PathSource {
    fn read_bytes(self: Box<Self>) -> LocalBoxFuture<'static, std::io::Result<Vec<u8>>> {
        async move { std::fs::read(&self.0) }.boxed_local()
    }
}

/// Guesses a media type from a file name's extension. Unknown extensions
/// give an empty string, which no allow-list matches.
pub fn media_type_from_name(name: &str) -> String {
    let ext = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "",
    }
    .to_owned()
}

/// One user-supplied file, consumed by a single ingestion attempt.
pub struct IngestionRequest {
    id: Uuid,
    name: String,
    media_type: String,
    size: u64,
    source: Box<dyn ByteSource>,
}

impl std::fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl IngestionRequest {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        size: u64,
        source: impl ByteSource + 'static,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            media_type: media_type.into(),
            size,
            source: Box::new(source),
        }
    }

    /// Request over bytes already in memory; size is their length.
    pub fn from_bytes(name: impl Into<String>, media_type: impl Into<String>, bytes: Arc<[u8]>) -> Self {
        let size = bytes.len() as u64;
        Self::new(name, media_type, size, MemorySource(bytes))
    }

    /// Request for a local file. The media type comes from the extension and
    /// the size from the file's metadata; an unreadable file reports size 0
    /// and fails when read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        let media_type = media_type_from_name(&name);
        let size = std::fs::metadata(&path).map(|meta| meta.len()).unwrap_or(0);
        Self::new(name, media_type, size, PathSource(path))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The media type the platform claims, not sniffed from content.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn into_source(self) -> Box<dyn ByteSource> {
        self.source
    }
}
