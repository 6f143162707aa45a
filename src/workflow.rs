//! The generate → download → upload workflow and its observable state.
//!
//! [`ImageWorkflow::run`] walks the three network steps strictly in order,
//! each one consuming the previous step's output. The outcome is published
//! as a [`WorkflowState`] on a watch channel so a front end can render
//! `Idle`, `Loading`, `Error`, or `Success` as they happen.

use reqwest::Url;
use tokio::sync::watch;

use crate::config::{ShareConfig, UploadConfig};
use crate::context::ServiceContext;
use crate::error::RelayError;
use crate::ports::{ImageFetcher, ImageGenerator, ImageHost, LinkOpener, UploadRequest};
use crate::share::share_url;

/// Message shown when a failure carries no text of its own.
const FALLBACK_ERROR: &str = "An error occurred";

/// Message left behind by a run that was dropped mid-flight.
const CANCELLED_ERROR: &str = "The run was cancelled before it finished";

/// Where the workflow currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing has run yet.
    #[default]
    Idle,
    /// A run is in flight.
    Loading,
    /// The last run failed.
    Error {
        /// Human-readable failure description.
        message: String,
    },
    /// The last run succeeded.
    Success {
        /// URL of the generated image.
        image_url: String,
        /// Hosted viewer page for the image.
        viewer_url: String,
    },
}

impl WorkflowState {
    /// The viewer URL, if the last run succeeded.
    #[must_use]
    pub fn viewer_url(&self) -> Option<&str> {
        match self {
            Self::Success { viewer_url, .. } => Some(viewer_url),
            _ => None,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// URL of the generated image.
    pub image_url: String,
    /// Hosted viewer page for the image.
    pub viewer_url: String,
}

/// Generates an image, rehosts it, and offers a share link.
pub struct ImageWorkflow {
    generator: Box<dyn ImageGenerator>,
    fetcher: Box<dyn ImageFetcher>,
    host: Box<dyn ImageHost>,
    opener: Box<dyn LinkOpener>,
    upload: UploadConfig,
    share: ShareConfig,
    state: watch::Sender<WorkflowState>,
}

impl ImageWorkflow {
    /// Assemble a workflow from its collaborators and settings.
    #[must_use]
    pub fn new(
        services: ServiceContext,
        opener: Box<dyn LinkOpener>,
        upload: UploadConfig,
        share: ShareConfig,
    ) -> Self {
        let (state, _) = watch::channel(WorkflowState::Idle);
        Self {
            generator: services.generator,
            fetcher: services.fetcher,
            host: services.host,
            opener,
            upload,
            share,
            state,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state.borrow().clone()
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state.subscribe()
    }

    /// Run the workflow once.
    ///
    /// Ends in `Success` or `Error`; the returned value mirrors that state.
    /// Dropping the future mid-flight also ends in `Error`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Busy`] without touching the state if a run is
    /// already loading. Otherwise returns the error of the first failing
    /// step.
    pub async fn run(&self) -> Result<Published, RelayError> {
        let started = self.state.send_if_modified(|state| {
            if *state == WorkflowState::Loading {
                return false;
            }
            *state = WorkflowState::Loading;
            true
        });
        if !started {
            tracing::warn!("Ignoring run request while another run is loading");
            return Err(RelayError::Busy);
        }
        let loading = LoadingGuard { state: &self.state, armed: true };

        match self.pipeline().await {
            Ok(published) => {
                tracing::info!(
                    image_url = %published.image_url,
                    viewer_url = %published.viewer_url,
                    "Workflow succeeded"
                );
                loading.settle(WorkflowState::Success {
                    image_url: published.image_url.clone(),
                    viewer_url: published.viewer_url.clone(),
                });
                Ok(published)
            }
            Err(e) => {
                tracing::warn!(step = ?e.step(), error = %e, "Workflow failed");
                loading.settle(WorkflowState::Error { message: error_message(&e) });
                Err(e)
            }
        }
    }

    async fn pipeline(&self) -> Result<Published, RelayError> {
        tracing::info!("Requesting generated image");
        let reference = self.generator.generate().await?;

        tracing::info!(%reference, "Downloading generated image");
        let image = self.fetcher.fetch(&reference).await?;
        tracing::debug!(
            bytes = image.bytes.len(),
            content_type = ?image.content_type,
            "Downloaded image"
        );

        tracing::info!(name = %self.upload.name, "Uploading image to host");
        let record = self.host.upload(&UploadRequest::new(image, &self.upload)).await?;
        let viewer_url = record.into_viewer_url()?;

        Ok(Published { image_url: reference.into_string(), viewer_url })
    }

    /// The share link for the last successful run, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Config`] if the share intent URL is invalid.
    pub fn share_link(&self) -> Result<Option<Url>, RelayError> {
        let state = self.state.borrow();
        state.viewer_url().map(|viewer| share_url(&self.share, viewer)).transpose()
    }

    /// Open the share link for the last successful run.
    ///
    /// Does nothing and returns `Ok(None)` unless the state is `Success`.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be built or opened.
    pub fn share_on_social(&self) -> Result<Option<Url>, RelayError> {
        let Some(url) = self.share_link()? else {
            tracing::debug!("No hosted image to share");
            return Ok(None);
        };
        tracing::info!(%url, "Opening share link");
        self.opener.open(&url)?;
        Ok(Some(url))
    }
}

/// Holds the `Loading` state for one run.
///
/// If the run future is dropped before it settles, the state moves to
/// `Error` so later runs are not rejected as busy.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<WorkflowState>,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, outcome: WorkflowState) {
        self.armed = false;
        self.state.send_replace(outcome);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Run dropped before it finished");
            self.state.send_replace(WorkflowState::Error { message: CANCELLED_ERROR.to_string() });
        }
    }
}

fn error_message(error: &impl std::fmt::Display) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        FALLBACK_ERROR.to_string()
    } else {
        message
    }
}
