//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable name, usually timestamp plus subject.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Port calls in the order they happened.
    pub interactions: Vec<Interaction>,
}

/// One call across a port boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the run, starting at zero.
    pub seq: u64,
    /// Port name, e.g. `image_host`.
    pub port: String,
    /// Method on the port, e.g. `upload`.
    pub method: String,
    /// Call input.
    #[serde(default)]
    pub input: serde_json::Value,
    /// `{"Ok": value}` or `{"Err": "message"}`.
    pub output: serde_json::Value,
}

/// `(port, method)` of the generator call.
pub const GENERATE: (&str, &str) = ("image_generator", "generate");
/// `(port, method)` of the download call.
pub const FETCH: (&str, &str) = ("image_fetcher", "fetch");
/// `(port, method)` of the upload call.
pub const UPLOAD: (&str, &str) = ("image_host", "upload");
