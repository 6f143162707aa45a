//! Live adapter for the image generator endpoint.

use reqwest::header::ACCEPT;
use reqwest::Client;

use super::{excerpt, network};
use crate::error::{RelayError, Step};
use crate::ports::image_generator::{GenerateFuture, ImageGenerator, ImageReference};

/// Generator that issues a plain GET and reads the image URL from the body.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
}

impl HttpGenerator {
    /// Create a generator for `endpoint`.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into() }
    }
}

impl ImageGenerator for HttpGenerator {
    fn generate(&self) -> GenerateFuture<'_> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.endpoint)
                .header(ACCEPT, "application/json, text/plain")
                .send()
                .await
                .map_err(network(Step::Generate))?;

            let status = response.status();
            let body = response.text().await.map_err(network(Step::Generate))?;

            if !status.is_success() {
                return Err(RelayError::Generation(format!(
                    "HTTP error! status: {}: {}",
                    status.as_u16(),
                    excerpt(&body)
                )));
            }

            parse_reference(&body)
        })
    }
}

/// Read the image reference out of a generator response body.
///
/// A JSON string literal is unwrapped; anything else is taken verbatim.
///
/// # Errors
///
/// Returns [`RelayError::Generation`] if the body holds no reference.
pub fn parse_reference(body: &str) -> Result<ImageReference, RelayError> {
    let body = body.trim();
    let url = match serde_json::from_str::<String>(body) {
        Ok(s) => s.trim().to_string(),
        Err(_) => body.to_string(),
    };
    if url.is_empty() {
        return Err(RelayError::Generation("generator returned an empty image reference".into()));
    }
    Ok(ImageReference::new(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_string_body_is_unwrapped() {
        let r = parse_reference("\"https://img.example/gen.jpg\"\n").unwrap();
        assert_eq!(r.as_str(), "https://img.example/gen.jpg");
    }

    #[test]
    fn raw_body_is_taken_verbatim() {
        let r = parse_reference("  https://img.example/raw.png  ").unwrap();
        assert_eq!(r.as_str(), "https://img.example/raw.png");
    }

    #[test]
    fn empty_body_is_generation_error() {
        assert!(matches!(parse_reference(""), Err(RelayError::Generation(_))));
        assert!(matches!(parse_reference("\"  \""), Err(RelayError::Generation(_))));
    }
}
