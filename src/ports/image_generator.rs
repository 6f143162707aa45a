//! Generator port: asks an external service for a freshly generated image.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Location of a generated image, as returned by the generator service.
///
/// Opaque: the only expectation is that a GET on it yields image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    /// Wrap a reference string.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the reference, returning the inner URL.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Boxed future type returned by [`ImageGenerator::generate`].
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ImageReference, RelayError>> + Send + 'a>>;

/// Produces a new image and reports where it can be fetched.
pub trait ImageGenerator: Send + Sync {
    /// Request a newly generated image.
    fn generate(&self) -> GenerateFuture<'_>;
}
