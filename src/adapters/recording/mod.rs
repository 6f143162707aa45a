//! Recording adapters that capture interactions to cassettes.

pub mod ports;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use crate::cassette::recorder::CassetteRecorder;
use crate::error::RelayError;

/// Record a `Result<T, RelayError>` interaction using the Ok/Err JSON
/// convention. Errors are stored without their step prefix.
///
/// An `Ok` value that cannot be serialized is recorded as an `Err`, so the
/// cassette keeps one interaction per call.
pub(crate) fn record_result<T: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    (port, method): (&str, &str),
    input: serde_json::Value,
    result: &Result<T, RelayError>,
) {
    let output = match result {
        Ok(v) => match serde_json::to_value(v) {
            Ok(inner) => serde_json::json!({ "Ok": inner }),
            Err(e) => {
                tracing::warn!(port, method, error = %e, "Could not serialize result for cassette");
                serde_json::json!({ "Err": format!("unrecordable result: {e}") })
            }
        },
        Err(e) => serde_json::json!({ "Err": e.detail() }),
    };

    recorder.lock().unwrap_or_else(PoisonError::into_inner).record(port, method, input, output);
}
