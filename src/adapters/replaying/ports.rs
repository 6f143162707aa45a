//! Replaying implementations of the generator, fetcher, and host ports.

use std::sync::{Arc, Mutex};

use serde_json::json;

use super::replay;
use crate::cassette::format::{FETCH, GENERATE, UPLOAD};
use crate::cassette::replayer::CassetteReplayer;
use crate::error::Step;
use crate::ports::image_fetcher::FetchFuture;
use crate::ports::image_generator::GenerateFuture;
use crate::ports::image_host::UploadFuture;
use crate::ports::{
    HostedImageRecord, ImageData, ImageFetcher, ImageGenerator, ImageHost, ImageReference,
    UploadRequest,
};

/// Serves recorded generator results.
pub struct ReplayingGenerator {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingGenerator {
    /// Create a generator backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageGenerator for ReplayingGenerator {
    fn generate(&self) -> GenerateFuture<'_> {
        let result = replay::<ImageReference>(&self.replayer, GENERATE, None, Step::Generate);
        Box::pin(async move { result })
    }
}

/// Serves recorded downloads.
pub struct ReplayingFetcher {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingFetcher {
    /// Create a fetcher backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageFetcher for ReplayingFetcher {
    fn fetch(&self, reference: &ImageReference) -> FetchFuture<'_> {
        tracing::debug!(%reference, "Replaying download");
        let requested = json!(reference);
        let result = replay::<ImageData>(&self.replayer, FETCH, Some(&requested), Step::Download);
        Box::pin(async move { result })
    }
}

/// Serves recorded uploads.
pub struct ReplayingHost {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingHost {
    /// Create a host backed by `replayer`.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl ImageHost for ReplayingHost {
    fn upload(&self, request: &UploadRequest) -> UploadFuture<'_> {
        tracing::debug!(name = %request.name, bytes = request.image.bytes.len(), "Replaying upload");
        let result = replay::<HostedImageRecord>(&self.replayer, UPLOAD, None, Step::Upload);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::config::UploadConfig;
    use crate::error::RelayError;
    use chrono::Utc;

    fn replayer(outputs: Vec<((&str, &str), serde_json::Value)>) -> Arc<Mutex<CassetteReplayer>> {
        let interactions = outputs
            .into_iter()
            .enumerate()
            .map(|(seq, ((port, method), output))| Interaction {
                seq: seq as u64,
                port: port.into(),
                method: method.into(),
                input: json!(null),
                output,
            })
            .collect();
        let cassette =
            Cassette { name: "t".into(), recorded_at: Utc::now(), commit: "c".into(), interactions };
        Arc::new(Mutex::new(CassetteReplayer::new(cassette)))
    }

    #[tokio::test]
    async fn replays_full_sequence() {
        let r = replayer(vec![
            (GENERATE, json!({"Ok": "https://img.example/gen.jpg"})),
            (FETCH, json!({"Ok": {"bytes": "AQID", "content_type": "image/jpeg"}})),
            (UPLOAD, json!({"Ok": {"success": true, "viewer_url": "https://ibb.co/xyz"}})),
        ]);

        let reference = ReplayingGenerator::new(Arc::clone(&r)).generate().await.unwrap();
        assert_eq!(reference.as_str(), "https://img.example/gen.jpg");

        let image = ReplayingFetcher::new(Arc::clone(&r)).fetch(&reference).await.unwrap();
        assert_eq!(image.bytes, vec![1, 2, 3]);

        let request = UploadRequest::new(image, &UploadConfig::default());
        let record = ReplayingHost::new(r).upload(&request).await.unwrap();
        assert_eq!(
            record,
            HostedImageRecord { success: true, viewer_url: Some("https://ibb.co/xyz".into()) }
        );
    }

    #[tokio::test]
    async fn recorded_error_keeps_its_step() {
        let r = replayer(vec![(FETCH, json!({"Err": "network error: timed out"}))]);
        let err = ReplayingFetcher::new(r)
            .fetch(&ImageReference::new("https://img.example/gen.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Download(ref m) if m == "network error: timed out"));
    }

    #[tokio::test]
    async fn fetch_of_another_reference_fails_the_download() {
        let interaction = Interaction {
            seq: 0,
            port: FETCH.0.into(),
            method: FETCH.1.into(),
            input: json!("https://img.example/gen.jpg"),
            output: json!({"Ok": {"bytes": "AQID"}}),
        };
        let cassette = Cassette {
            name: "t".into(),
            recorded_at: Utc::now(),
            commit: "c".into(),
            interactions: vec![interaction],
        };
        let r = Arc::new(Mutex::new(CassetteReplayer::new(cassette)));

        let err = ReplayingFetcher::new(r)
            .fetch(&ImageReference::new("https://img.example/other.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Download(ref m) if m.contains("cassette diverged")));
    }

    #[tokio::test]
    async fn exhausted_cassette_fails_the_step() {
        let r = replayer(vec![]);
        let err = ReplayingGenerator::new(r).generate().await.unwrap_err();
        assert!(matches!(err, RelayError::Generation(ref m) if m.contains("cassette exhausted")));
    }

    #[tokio::test]
    async fn undecodable_output_fails_the_step() {
        let r = replayer(vec![(UPLOAD, json!({"Ok": {"viewer_url": 7}}))]);
        let image = ImageData { bytes: vec![1], content_type: None };
        let request = UploadRequest::new(image, &UploadConfig::default());
        let err = ReplayingHost::new(r).upload(&request).await.unwrap_err();
        assert!(matches!(err, RelayError::Upload(ref m) if m.contains("undecodable")));
    }
}
