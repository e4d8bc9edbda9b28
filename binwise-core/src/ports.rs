//! Traits describing the external capabilities the service depends on.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;

use crate::model::{RecordId, WasteLogRecord};

/// Mime type attached to every uploaded image.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Instruction sent to the classifier alongside the image.
pub const CLASSIFY_INSTRUCTION: &str = "Analyze this image. Classify it into EXACTLY one of these 12 categories: \
[battery, biological, brown-glass, cardboard, clothes, green-glass, metal, paper, plastic, shoes, trash, white-glass]. \
Return ONLY the category name in lowercase. Do not write sentences.";

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the classifier or the waste log.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// Backend answered with a non-success status.
    #[error("Upstream error ({status}): {message}")]
    Upstream {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Response body or status text.
        message: String,
    },
    /// Backend response could not be interpreted.
    #[error("Decode error: {0}")]
    Decode(String),
    /// Internal adapter error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[async_trait]
/// Image classification capability: image bytes in, raw label out.
pub trait Classifier: Send + Sync {
    /// Ask the model for a category label.
    ///
    /// The returned string is not validated; callers normalize it and rely on the
    /// routing fallback for anything unexpected.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the model cannot be reached or answers badly.
    async fn classify(&self, image: &[u8], mime_type: &str) -> Result<String, PortError>;
}

#[async_trait]
/// Append-only store for classification events.
pub trait WasteLog: Send + Sync {
    /// Append a record and return the identifier assigned by the store.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the write is not acknowledged.
    async fn append(&self, record: &WasteLogRecord) -> Result<RecordId, PortError>;
}
