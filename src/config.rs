//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Environment variable holding the ImgBB API key.
pub const IMGBB_KEY_ENV: &str = "IMGBB_API_KEY";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// External service endpoints.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Upload record settings.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Share link settings.
    #[serde(default)]
    pub share: ShareConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// ImgBB API key.
    pub imgbb: Option<String>,
}

/// Endpoints of the generator and hosting services.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// Generator endpoint; a GET returns the URL of a fresh image.
    pub generator: String,
    /// ImgBB upload endpoint.
    pub host: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            generator: "https://ai16z-image-generator-hnxc8rtju-rubys-projects-fb9e0c83.vercel.app/api/generate-image"
                .to_string(),
            host: "https://api.imgbb.com/1/upload".to_string(),
        }
    }
}

/// How the uploaded record is named.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Value of the `name` form field.
    pub name: String,
    /// Filename attached to the `image` form field.
    pub filename: String,
    /// Optional auto-delete delay in seconds, forwarded to ImgBB.
    pub expiration: Option<u64>,
    /// Reject downloads that are not a recognizable image format.
    pub verify_image: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            name: "eliza_wisdom".to_string(),
            filename: "eliza_wisdom.jpg".to_string(),
            expiration: None,
            verify_image: false,
        }
    }
}

/// Share intent settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Base URL of the share intent.
    pub intent_url: String,
    /// Text placed in the `text` parameter.
    pub hashtag: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            intent_url: "https://twitter.com/intent/tweet".to_string(),
            hashtag: "#AI16Z".to_string(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl HttpConfig {
    /// The per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the ImgBB API key, preferring the environment variable.
    #[must_use]
    pub fn imgbb_key(&self) -> Option<String> {
        resolve_key(std::env::var(IMGBB_KEY_ENV).ok(), self.keys.imgbb.as_deref())
    }
}

/// A non-empty environment value wins over the config file value.
fn resolve_key(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.filter(|k| !k.is_empty()).or_else(|| file.map(str::to_string))
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `IMGRELAY_CONFIG` environment variable
/// 3. `~/.config/imgrelay/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("IMGRELAY_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/imgrelay/config.toml")
    } else {
        PathBuf::from("imgrelay.toml")
    }
}
