//! Live adapters that talk to the real services.

pub mod browser;
pub mod fetcher;
pub mod generator;
pub mod imgbb;

use std::time::Duration;

use reqwest::Client;

use crate::error::{RelayError, Step};

/// Longest response body excerpt carried in an error message.
const MAX_BODY_EXCERPT: usize = 500;

/// Build the HTTP client shared by the live adapters.
///
/// # Errors
///
/// Returns [`RelayError::Config`] if the TLS backend cannot be initialized.
pub fn http_client(timeout: Duration) -> Result<Client, RelayError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("imgrelay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Map a transport failure onto the error of the step that issued it.
pub(crate) fn network(step: Step) -> impl Fn(reqwest::Error) -> RelayError {
    move |e| RelayError::at(step, format!("network error: {e}"))
}

/// Shorten a response body for inclusion in an error message.
pub(crate) fn excerpt(body: &str) -> String {
    let body = body.trim();
    if body.len() <= MAX_BODY_EXCERPT {
        return body.to_string();
    }
    let mut end = MAX_BODY_EXCERPT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_bodies() {
        assert_eq!(excerpt("  bad gateway \n"), "bad gateway");
    }

    #[test]
    fn excerpt_truncates_on_char_boundary() {
        let body = "é".repeat(400);
        let short = excerpt(&body);
        assert!(short.ends_with("..."));
        assert!(short.len() <= MAX_BODY_EXCERPT + 3);
    }

    #[test]
    fn network_error_lands_on_step() {
        let req_err = Client::new().get("://bad").build().unwrap_err();
        let err = network(Step::Download)(req_err);
        assert!(matches!(err, RelayError::Download(ref m) if m.starts_with("network error")));
    }

    #[test]
    fn client_builds() {
        assert!(http_client(Duration::from_secs(1)).is_ok());
    }
}
