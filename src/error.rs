//! Unified error type for imgrelay.

use std::fmt;

use thiserror::Error;

/// The three network steps of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Asking the generator service for a new image.
    Generate,
    /// Downloading the generated image bytes.
    Download,
    /// Uploading the bytes to the hosting service.
    Upload,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generate => "generate",
            Self::Download => "download",
            Self::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while relaying an image.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The generator service failed or returned an unusable reference.
    #[error("Image generation failed: {0}")]
    Generation(String),

    /// The generated image could not be downloaded.
    #[error("Image download failed: {0}")]
    Download(String),

    /// The hosting service rejected the upload or answered with garbage.
    #[error("Image upload failed: {0}")]
    Upload(String),

    /// A run was requested while another one is still loading.
    #[error("A workflow run is already in progress")]
    Busy,

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// No hosting API key configured.
    #[error("No ImgBB API key. Set {env_var} or add it to config file.")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The share link could not be opened.
    #[error("Could not open share link: {0}")]
    Browser(String),
}

impl RelayError {
    /// The workflow step this error is attributed to, if any.
    #[must_use]
    pub fn step(&self) -> Option<Step> {
        match self {
            Self::Generation(_) => Some(Step::Generate),
            Self::Download(_) => Some(Step::Download),
            Self::Upload(_) => Some(Step::Upload),
            _ => None,
        }
    }

    /// The message without the step prefix, for step errors; the full
    /// display text otherwise.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Generation(m) | Self::Download(m) | Self::Upload(m) => m.clone(),
            other => other.to_string(),
        }
    }

    /// Build the error variant belonging to `step`.
    #[must_use]
    pub fn at(step: Step, message: impl Into<String>) -> Self {
        let message = message.into();
        match step {
            Step::Generate => Self::Generation(message),
            Step::Download => Self::Download(message),
            Step::Upload => Self::Upload(message),
        }
    }
}
