//! Live adapter that downloads generated images over HTTP.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::network;
use crate::error::{RelayError, Step};
use crate::ports::image_fetcher::{FetchFuture, ImageFetcher};
use crate::ports::{ImageData, ImageReference};

/// Fetches image bytes with a GET on the reference URL.
pub struct HttpFetcher {
    client: Client,
    verify_image: bool,
}

impl HttpFetcher {
    /// Create a fetcher. With `verify_image`, payloads that are not a known
    /// image format are rejected.
    #[must_use]
    pub fn new(client: Client, verify_image: bool) -> Self {
        Self { client, verify_image }
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, reference: &ImageReference) -> FetchFuture<'_> {
        let url = reference.as_str().to_string();
        Box::pin(async move {
            let response = self.client.get(&url).send().await.map_err(network(Step::Download))?;

            let status = response.status();
            if !status.is_success() {
                return Err(RelayError::Download(format!("HTTP {} from {url}", status.as_u16())));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response.bytes().await.map_err(network(Step::Download))?.to_vec();

            check_payload(&bytes, self.verify_image)?;
            Ok(ImageData { bytes, content_type })
        })
    }
}

/// Reject empty payloads, and unrecognized formats when `verify` is set.
///
/// # Errors
///
/// Returns [`RelayError::Download`] describing the rejection.
pub fn check_payload(bytes: &[u8], verify: bool) -> Result<(), RelayError> {
    if bytes.is_empty() {
        return Err(RelayError::Download("image payload is empty".into()));
    }
    if verify {
        image::guess_format(bytes).map_err(|e| {
            RelayError::Download(format!("payload is not a recognizable image: {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn empty_payload_rejected() {
        assert!(matches!(check_payload(&[], false), Err(RelayError::Download(_))));
    }

    #[test]
    fn unverified_payload_accepted() {
        assert!(check_payload(b"<html>", false).is_ok());
    }

    #[test]
    fn verify_rejects_non_images() {
        let err = check_payload(b"<html>", true).unwrap_err();
        assert!(err.to_string().contains("not a recognizable image"));
    }

    #[test]
    fn verify_accepts_jpeg() {
        assert!(check_payload(&JPEG_MAGIC, true).is_ok());
    }

    #[tokio::test]
    async fn malformed_reference_is_download_error() {
        let fetcher = HttpFetcher::new(Client::new(), false);
        let err = fetcher.fetch(&ImageReference::new("not a url")).await.unwrap_err();
        assert!(matches!(err, RelayError::Download(_)));
    }
}
