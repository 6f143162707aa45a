//! Fetcher port: downloads the bytes behind an [`ImageReference`].

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::ImageReference;
use crate::error::RelayError;

/// Raw image payload as downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Raw bytes, base64 encoded in cassettes.
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the image server, if any.
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ImageData {
    /// MIME type for the upload: sniffed from the bytes first, then the
    /// server's `Content-Type`, then `image/jpeg`.
    #[must_use]
    pub fn mime_type(&self) -> String {
        if let Ok(format) = image::guess_format(&self.bytes) {
            return format.to_mime_type().to_string();
        }
        match self.content_type.as_deref() {
            Some(ct) if ct.starts_with("image/") => {
                ct.split(';').next().unwrap_or(ct).trim().to_string()
            }
            _ => "image/jpeg".to_string(),
        }
    }
}

/// Boxed future type returned by [`ImageFetcher::fetch`].
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<ImageData, RelayError>> + Send + 'a>>;

/// Downloads generated images.
pub trait ImageFetcher: Send + Sync {
    /// Download the image at `reference`.
    fn fetch(&self, reference: &ImageReference) -> FetchFuture<'_>;
}

/// Serde helper for serializing `Vec<u8>` as base64 strings in cassettes.
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
