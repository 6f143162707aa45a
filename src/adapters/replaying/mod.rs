//! Replaying adapters that serve recorded interactions from cassettes.

pub mod ports;

use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::error::{RelayError, Step};

/// Serve the next recorded call for `(port, method)` as the result of `step`.
///
/// `input`, when given, must match the recorded input.
///
/// Replay problems (exhausted or diverging cassette, undecodable output) are
/// reported as errors of `step`, like any other failure of that step.
pub(crate) fn replay<T: DeserializeOwned>(
    replayer: &Arc<Mutex<CassetteReplayer>>,
    (port, method): (&str, &str),
    input: Option<&serde_json::Value>,
    step: Step,
) -> Result<T, RelayError> {
    let interaction = replayer
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .next_interaction(port, method, input)
        .map_err(|e| RelayError::at(step, format!("replay: {e}")))?;

    let output = interaction.output;
    if let Some(err) = output.get("Err").or_else(|| output.get("err")) {
        let message = err.as_str().unwrap_or("replayed error");
        return Err(RelayError::at(step, message));
    }
    let value = output.get("Ok").or_else(|| output.get("ok")).cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| RelayError::at(step, format!("replay: undecodable output: {e}")))
}
