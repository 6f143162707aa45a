//! Replays recorded interactions from a cassette, strictly in order.

use std::collections::VecDeque;
use std::path::Path;

use thiserror::Error;

use super::format::{Cassette, Interaction};

/// Why a replayed call could not be served.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Every recorded interaction has been consumed.
    #[error("cassette exhausted: no interaction left for {port}::{method}")]
    Exhausted {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
    },

    /// The next recorded interaction belongs to a different call.
    #[error("cassette out of order: expected {expected}, run called {called}")]
    OutOfOrder {
        /// `port::method` of the next recorded interaction.
        expected: String,
        /// `port::method` the run actually called.
        called: String,
    },

    /// The next recorded interaction is for the same call with a different input.
    #[error("cassette diverged: {call} was recorded with {recorded}, run passed {requested}")]
    InputMismatch {
        /// `port::method` of the call.
        call: String,
        /// Recorded input.
        recorded: serde_json::Value,
        /// Input the run actually passed.
        requested: serde_json::Value,
    },
}

/// Serves cassette interactions in the order they were recorded.
///
/// A workflow run is a fixed sequence of calls, so a replay that asks for
/// anything other than the next recorded call is a divergence.
#[derive(Debug)]
pub struct CassetteReplayer {
    queue: VecDeque<Interaction>,
}

impl CassetteReplayer {
    /// Create a replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: Cassette) -> Self {
        let mut interactions = cassette.interactions;
        interactions.sort_by_key(|i| i.seq);
        Self { queue: interactions.into() }
    }

    /// Load a YAML cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette: Cassette = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(Self::new(cassette))
    }

    /// Take the next interaction, which must be for `port::method`.
    ///
    /// When `input` is given and the interaction recorded a non-null input,
    /// the two must be equal.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] if the cassette is exhausted, the next
    /// interaction is for a different call, or its input differs. A
    /// mismatched interaction is left in place.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
        input: Option<&serde_json::Value>,
    ) -> Result<Interaction, ReplayError> {
        let Some(next) = self.queue.front() else {
            return Err(ReplayError::Exhausted { port: port.to_string(), method: method.to_string() });
        };
        if next.port != port || next.method != method {
            return Err(ReplayError::OutOfOrder {
                expected: format!("{}::{}", next.port, next.method),
                called: format!("{port}::{method}"),
            });
        }
        if let Some(requested) = input {
            if !next.input.is_null() && next.input != *requested {
                return Err(ReplayError::InputMismatch {
                    call: format!("{port}::{method}"),
                    recorded: next.input.clone(),
                    requested: requested.clone(),
                });
            }
        }
        self.queue.pop_front().ok_or_else(|| ReplayError::Exhausted {
            port: port.to_string(),
            method: method.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str) -> Interaction {
        Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: json!(null),
            output: json!({"Ok": null}),
        }
    }

    fn cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette { name: "test".into(), recorded_at: Utc::now(), commit: "abc".into(), interactions }
    }

    #[test]
    fn serves_in_seq_order() {
        let mut replayer = CassetteReplayer::new(cassette(vec![
            interaction(1, "image_fetcher", "fetch"),
            interaction(0, "image_generator", "generate"),
        ]));

        assert_eq!(replayer.next_interaction("image_generator", "generate", None).unwrap().seq, 0);
        assert_eq!(replayer.next_interaction("image_fetcher", "fetch", None).unwrap().seq, 1);
        assert!(replayer.next_interaction("image_host", "upload", None).is_err());
    }

    #[test]
    fn exhausted_is_an_error() {
        let mut replayer = CassetteReplayer::new(cassette(vec![]));
        let err = replayer.next_interaction("image_host", "upload", None).unwrap_err();
        assert!(matches!(err, ReplayError::Exhausted { .. }));
        assert!(err.to_string().contains("image_host::upload"));
    }

    #[test]
    fn out_of_order_keeps_interaction() {
        let mut replayer =
            CassetteReplayer::new(cassette(vec![interaction(0, "image_generator", "generate")]));
        let err = replayer.next_interaction("image_host", "upload", None).unwrap_err();
        assert!(matches!(err, ReplayError::OutOfOrder { .. }));
        assert!(replayer.next_interaction("image_generator", "generate", None).is_ok());
    }

    #[test]
    fn fetch_of_a_different_reference_diverges() {
        let mut fetch = interaction(0, "image_fetcher", "fetch");
        fetch.input = json!("https://img.example/gen.jpg");
        let mut replayer = CassetteReplayer::new(cassette(vec![fetch]));

        let other = json!("https://img.example/other.jpg");
        let err = replayer.next_interaction("image_fetcher", "fetch", Some(&other)).unwrap_err();
        assert!(matches!(err, ReplayError::InputMismatch { .. }));
        assert!(err.to_string().contains("other.jpg"));

        let same = json!("https://img.example/gen.jpg");
        assert!(replayer.next_interaction("image_fetcher", "fetch", Some(&same)).is_ok());
    }

    #[test]
    fn null_recorded_input_is_not_compared() {
        let mut replayer =
            CassetteReplayer::new(cassette(vec![interaction(0, "image_fetcher", "fetch")]));
        let requested = json!("https://img.example/gen.jpg");
        assert!(replayer.next_interaction("image_fetcher", "fetch", Some(&requested)).is_ok());
    }

    #[test]
    fn load_from_yaml_file() {
        let dir = std::env::temp_dir().join("imgrelay_replayer_load_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("run.cassette.yaml");
        let yaml = serde_yaml::to_string(&cassette(vec![interaction(0, "image_generator", "generate")]))
            .unwrap();
        std::fs::write(&path, yaml).unwrap();

        let mut replayer = CassetteReplayer::load(&path).unwrap();
        assert!(replayer.next_interaction("image_generator", "generate", None).is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_nonexistent_fails() {
        assert!(CassetteReplayer::load(Path::new("/nonexistent/cassette.yaml")).is_err());
    }
}
