//! Photo Payloads
//!
//! Uploaded images live in memory as `data:` URLs for the session only.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Failed to read photo: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Photo is empty")]
    Empty,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub media_type: String,
    pub data_url: String,
}

impl Photo {
    /// Encode raw image bytes. Only `image/*` media types are accepted.
    pub fn from_bytes(media_type: &str, data: &[u8]) -> Result<Self, PhotoError> {
        if !media_type.starts_with("image/") {
            return Err(PhotoError::UnsupportedMediaType(media_type.to_string()));
        }
        if data.is_empty() {
            return Err(PhotoError::Empty);
        }

        let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, data);
        Ok(Self {
            media_type: media_type.to_string(),
            data_url: format!("data:{};base64,{}", media_type, encoded),
        })
    }

    /// Read a local image file, inferring the media type from its extension.
    pub fn load(path: &Path) -> Result<Self, PhotoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let media_type = media_type_for(&ext)
            .ok_or_else(|| PhotoError::UnsupportedMediaType(format!(".{}", ext)))?;
        let data = fs::read(path)?;
        Self::from_bytes(media_type, &data)
    }
}

fn media_type_for(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
