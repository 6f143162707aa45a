//! Host port: publishes image bytes and returns a durable viewer link.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use super::ImageData;
use crate::config::UploadConfig;
use crate::error::RelayError;

/// Everything the hosting service needs for one upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Value of the `name` form field.
    pub name: String,
    /// Filename attached to the `image` form field.
    pub filename: String,
    /// Optional auto-delete delay in seconds.
    #[serde(default)]
    pub expiration: Option<u64>,
    /// The image itself.
    pub image: ImageData,
}

impl UploadRequest {
    /// Build a request for `image` using the configured record naming.
    #[must_use]
    pub fn new(image: ImageData, settings: &UploadConfig) -> Self {
        Self {
            name: settings.name.clone(),
            filename: settings.filename.clone(),
            expiration: settings.expiration,
            image,
        }
    }
}

/// Outcome reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedImageRecord {
    /// Whether the service accepted the upload.
    pub success: bool,
    /// Shareable viewer page, present when `success` is true.
    #[serde(default)]
    pub viewer_url: Option<String>,
}

impl HostedImageRecord {
    /// Extract the viewer URL from a successful record.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Upload`] if the service reported failure or
    /// omitted the viewer URL.
    pub fn into_viewer_url(self) -> Result<String, RelayError> {
        if !self.success {
            return Err(RelayError::Upload("hosting service reported failure".into()));
        }
        self.viewer_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| RelayError::Upload("response is missing data.url_viewer".into()))
    }
}

/// Boxed future type returned by [`ImageHost::upload`].
pub type UploadFuture<'a> =
    Pin<Box<dyn Future<Output = Result<HostedImageRecord, RelayError>> + Send + 'a>>;

/// Publishes images to an external host.
pub trait ImageHost: Send + Sync {
    /// Upload the image described by `request`.
    fn upload(&self, request: &UploadRequest) -> UploadFuture<'_>;
}
