//! Social share intent links.

use reqwest::Url;

use crate::config::ShareConfig;
use crate::error::RelayError;

/// Build the share intent URL for a hosted viewer page.
///
/// The hashtag goes into `text` and the viewer URL into `url`, both
/// form-encoded, so `#AI16Z` becomes `%23AI16Z`.
///
/// # Errors
///
/// Returns [`RelayError::Config`] if the configured intent URL is not a
/// valid absolute URL.
pub fn share_url(settings: &ShareConfig, viewer_url: &str) -> Result<Url, RelayError> {
    Url::parse_with_params(
        &settings.intent_url,
        [("text", settings.hashtag.as_str()), ("url", viewer_url)],
    )
    .map_err(|e| RelayError::Config(format!("Invalid share intent URL '{}': {e}", settings.intent_url)))
}
