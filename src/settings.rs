use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV_VAR: &str = "PAINT_BY_NUMBERS_CONFIG";

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Limits applied to every candidate image before it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to the defaults below
pub struct IngestSettings {
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
    /// Accepted media types, compared verbatim with the claimed type.
    pub allowed_types: Vec<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allowed_types: ["image/png", "image/jpeg", "image/jpg", "image/gif", "image/webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ingest: IngestSettings,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
