//! Service context that bundles the network port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::adapters::live::fetcher::HttpFetcher;
use crate::adapters::live::generator::HttpGenerator;
use crate::adapters::live::http_client;
use crate::adapters::live::imgbb::ImgBbHost;
use crate::adapters::recording::ports::{RecordingFetcher, RecordingGenerator, RecordingHost};
use crate::adapters::replaying::ports::{ReplayingFetcher, ReplayingGenerator, ReplayingHost};
use crate::cassette::recorder::CassetteRecorder;
use crate::cassette::replayer::CassetteReplayer;
use crate::config::{Config, IMGBB_KEY_ENV};
use crate::error::RelayError;
use crate::ports::{ImageFetcher, ImageGenerator, ImageHost};

/// The three network collaborators of a workflow run.
pub struct ServiceContext {
    /// Generator port.
    pub generator: Box<dyn ImageGenerator>,
    /// Download port.
    pub fetcher: Box<dyn ImageFetcher>,
    /// Hosting port.
    pub host: Box<dyn ImageHost>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Write the cassette to disk.
    ///
    /// Call after the context built alongside this session has been dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if adapters still hold the recorder and
    /// [`RelayError::Io`] if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, RelayError> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| RelayError::Config("recording adapters still hold the recorder".into()))?
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(interactions = recorder.recorded(), "Writing cassette");
        Ok(recorder.finish()?)
    }
}

impl ServiceContext {
    /// Create a live context talking to the configured endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn live(config: &Config) -> Result<Self, RelayError> {
        let api_key = config
            .imgbb_key()
            .ok_or_else(|| RelayError::MissingApiKey { env_var: IMGBB_KEY_ENV.into() })?;
        let client = http_client(config.http.timeout())?;

        Ok(Self {
            generator: Box::new(HttpGenerator::new(client.clone(), &config.endpoints.generator)),
            fetcher: Box::new(HttpFetcher::new(client.clone(), config.upload.verify_image)),
            host: Box::new(ImgBbHost::new(client, &config.endpoints.host, api_key)),
        })
    }

    /// Create a recording context that wraps the live adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if the live context cannot be created.
    pub fn recording(config: &Config) -> Result<(Self, RecordingSession), RelayError> {
        let live = Self::live(config)?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".imgrelay/cassettes")
            .join(&timestamp)
            .join("workflow.cassette.yaml");
        let recorder = CassetteRecorder::new(path, format!("{timestamp}-workflow"), commit_hash());
        Ok(live.recorded_into(recorder))
    }

    /// Wrap every port of this context so its calls land in `recorder`.
    #[must_use]
    pub fn recorded_into(self, recorder: CassetteRecorder) -> (Self, RecordingSession) {
        let recorder = Arc::new(Mutex::new(recorder));
        let ctx = Self {
            generator: Box::new(RecordingGenerator::new(self.generator, Arc::clone(&recorder))),
            fetcher: Box::new(RecordingFetcher::new(self.fetcher, Arc::clone(&recorder))),
            host: Box::new(RecordingHost::new(self.host, Arc::clone(&recorder))),
        };
        (ctx, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file. Needs no API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, RelayError> {
        let replayer = CassetteReplayer::load(path)
            .map_err(|e| RelayError::Config(format!("Failed to load cassette: {e}")))?;
        let replayer = Arc::new(Mutex::new(replayer));
        Ok(Self {
            generator: Box::new(ReplayingGenerator::new(Arc::clone(&replayer))),
            fetcher: Box::new(ReplayingFetcher::new(Arc::clone(&replayer))),
            host: Box::new(ReplayingHost::new(replayer)),
        })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeysConfig;

    #[test]
    fn live_requires_api_key() {
        std::env::remove_var(IMGBB_KEY_ENV);
        let err = ServiceContext::live(&Config::default()).err().unwrap();
        assert!(matches!(err, RelayError::MissingApiKey { .. }));
    }

    #[test]
    fn live_with_key_from_file() {
        assert!(ServiceContext::live(&keyed_config()).is_ok());
    }

    fn keyed_config() -> Config {
        Config { keys: KeysConfig { imgbb: Some("from-file".into()) }, ..Config::default() }
    }

    #[test]
    fn finish_while_adapters_hold_the_recorder_fails() {
        let recorder = CassetteRecorder::new("/tmp/imgrelay-unused.cassette.yaml", "t", "c");
        let (ctx, session) = ServiceContext::live(&keyed_config()).unwrap().recorded_into(recorder);

        let err = session.finish().unwrap_err();
        assert!(matches!(err, RelayError::Config(ref m) if m.contains("still hold")));
        drop(ctx);
    }

    #[test]
    fn unwritable_cassette_is_io_error() {
        let dir = std::env::temp_dir().join("imgrelay_unwritable_cassette_test");
        std::fs::create_dir_all(&dir).unwrap();
        let blocker = dir.join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let recorder = CassetteRecorder::new(blocker.join("run.cassette.yaml"), "t", "c");
        let (ctx, session) = ServiceContext::live(&keyed_config()).unwrap().recorded_into(recorder);
        drop(ctx);

        assert!(matches!(session.finish(), Err(RelayError::Io(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn replaying_missing_cassette_is_config_error() {
        let err = ServiceContext::replaying(Path::new("/nonexistent/run.cassette.yaml")).err().unwrap();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
