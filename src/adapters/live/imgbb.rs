//! Live adapter for the `ImgBB` upload API.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::{excerpt, network};
use crate::error::{RelayError, Step};
use crate::ports::image_host::{ImageHost, UploadFuture};
use crate::ports::{HostedImageRecord, UploadRequest};

/// Uploads images to `ImgBB` with a static API key.
pub struct ImgBbHost {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ImgBbHost {
    /// Create a host adapter posting to `endpoint` with `api_key`.
    #[must_use]
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: String) -> Self {
        Self { client, endpoint: endpoint.into(), api_key }
    }
}

impl ImageHost for ImgBbHost {
    fn upload(&self, request: &UploadRequest) -> UploadFuture<'_> {
        let built = upload_request(&self.client, &self.endpoint, &self.api_key, request);
        Box::pin(async move {
            let response = built?.send().await.map_err(network(Step::Upload))?;
            let status = response.status();
            let body = response.text().await.map_err(network(Step::Upload))?;
            parse_upload_response(status.as_u16(), &body)
        })
    }
}

/// Build the multipart POST for one upload.
///
/// The key (and expiration, if set) travel as query parameters; the form
/// carries `image` and `name`.
///
/// # Errors
///
/// Returns [`RelayError::Upload`] if the sniffed MIME type is unusable.
pub fn upload_request(
    client: &Client,
    endpoint: &str,
    api_key: &str,
    request: &UploadRequest,
) -> Result<RequestBuilder, RelayError> {
    let image = Part::bytes(request.image.bytes.clone())
        .file_name(request.filename.clone())
        .mime_str(&request.image.mime_type())
        .map_err(|e| RelayError::Upload(format!("invalid image MIME type: {e}")))?;
    let form = Form::new().part("image", image).text("name", request.name.clone());

    let mut query = vec![("key", api_key.to_string())];
    if let Some(expiration) = request.expiration {
        query.push(("expiration", expiration.to_string()));
    }

    Ok(client.post(endpoint).query(&query).multipart(form))
}

/// Interpret an `ImgBB` response body.
///
/// A readable body with `success: false` yields a record, not an error; the
/// workflow decides what failure means.
///
/// # Errors
///
/// Returns [`RelayError::Upload`] if the body is not JSON or lacks `success`.
pub fn parse_upload_response(status: u16, body: &str) -> Result<HostedImageRecord, RelayError> {
    let parsed: ImgBbResponse = serde_json::from_str(body).map_err(|e| {
        RelayError::Upload(format!("unreadable response (HTTP {status}): {e}: {}", excerpt(body)))
    })?;

    let success = parsed
        .success
        .ok_or_else(|| RelayError::Upload(format!("response (HTTP {status}) has no success flag")))?;

    if !success {
        let reason = parsed.error.and_then(|e| e.message).unwrap_or_default();
        tracing::warn!(status, reason = %reason, "ImgBB rejected upload");
    }

    Ok(HostedImageRecord { success, viewer_url: parsed.data.and_then(|d| d.url_viewer) })
}

// --- ImgBB API response types ---

#[derive(Deserialize)]
struct ImgBbResponse {
    success: Option<bool>,
    data: Option<ImgBbData>,
    error: Option<ImgBbErrorBody>,
}

#[derive(Deserialize)]
struct ImgBbData {
    url_viewer: Option<String>,
}

#[derive(Deserialize)]
struct ImgBbErrorBody {
    message: Option<String>,
}
