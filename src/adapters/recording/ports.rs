//! Recording wrappers for the generator, fetcher, and host ports.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::record_result;
use crate::cassette::format::{FETCH, GENERATE, UPLOAD};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::image_fetcher::FetchFuture;
use crate::ports::image_generator::GenerateFuture;
use crate::ports::image_host::UploadFuture;
use crate::ports::{ImageFetcher, ImageGenerator, ImageHost, ImageReference, UploadRequest};

/// Records generator calls while delegating to an inner implementation.
pub struct RecordingGenerator {
    inner: Box<dyn ImageGenerator>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGenerator {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn ImageGenerator>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageGenerator for RecordingGenerator {
    fn generate(&self) -> GenerateFuture<'_> {
        Box::pin(async move {
            let result = self.inner.generate().await;
            record_result(&self.recorder, GENERATE, serde_json::Value::Null, &result);
            result
        })
    }
}

/// Records downloads while delegating to an inner implementation.
pub struct RecordingFetcher {
    inner: Box<dyn ImageFetcher>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingFetcher {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn ImageFetcher>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageFetcher for RecordingFetcher {
    fn fetch(&self, reference: &ImageReference) -> FetchFuture<'_> {
        let reference = reference.clone();
        Box::pin(async move {
            let result = self.inner.fetch(&reference).await;
            record_result(&self.recorder, FETCH, json!(reference), &result);
            result
        })
    }
}

/// Records uploads while delegating to an inner implementation.
///
/// The recorded input summarizes the image instead of repeating its bytes.
pub struct RecordingHost {
    inner: Box<dyn ImageHost>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingHost {
    /// Wrap `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn ImageHost>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl ImageHost for RecordingHost {
    fn upload(&self, request: &UploadRequest) -> UploadFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let result = self.inner.upload(&request).await;
            let input = json!({
                "name": request.name,
                "filename": request.filename,
                "expiration": request.expiration,
                "bytes": request.image.bytes.len(),
                "mime_type": request.image.mime_type(),
            });
            record_result(&self.recorder, UPLOAD, input, &result);
            result
        })
    }
}
