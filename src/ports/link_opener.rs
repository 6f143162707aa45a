//! Link opener port: hands a URL to the user's browser context.

use reqwest::Url;

use crate::error::RelayError;

/// Opens links on behalf of the user.
pub trait LinkOpener: Send + Sync {
    /// Open `url`, typically in a new browser tab.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Browser`] if the link could not be handed off.
    fn open(&self, url: &Url) -> Result<(), RelayError>;
}
