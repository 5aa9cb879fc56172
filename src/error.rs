use thiserror::Error;

const MIB: f64 = 1024.0 * 1024.0;

/// Formats a byte count as mebibytes with two decimals, e.g. `10.00`.
pub fn format_mib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / MIB)
}

fn mib(bytes: &u64) -> String {
    format_mib(*bytes)
}

/// Broad class of an [`IngestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestErrorKind {
    /// Rejected before any bytes were read.
    Validation,
    Read,
    Decode,
    Cancelled,
}

/// Why an image could not be ingested.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid file type. Allowed types: {}", .allowed.join(", "))]
    UnsupportedType {
        media_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large. Maximum size: {}MB", mib(.limit))]
    TooLarge { size: u64, limit: u64 },

    #[error("Error reading file")]
    Read(#[source] std::io::Error),

    #[error("Failed to load image")]
    Decode(#[source] image::ImageError),

    #[error("Ingestion cancelled")]
    Cancelled,
}

impl IngestError {
    pub fn kind(&self) -> IngestErrorKind {
        match self {
            Self::UnsupportedType { .. } | Self::TooLarge { .. } => IngestErrorKind::Validation,
            Self::Read(_) => IngestErrorKind::Read,
            Self::Decode(_) => IngestErrorKind::Decode,
            Self::Cancelled => IngestErrorKind::Cancelled,
        }
    }

    /// Text for the error notification; `None` when the user should not be
    /// told anything.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Cancelled => None,
            other => Some(other.to_string()),
        }
    }
}

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}
