//! Execution tracing for Lyra reasoning runs.
//!
//! Every reasoning step leaves a [`Trace`] in the run's trace chain. Traces
//! are values: [`Trace::start`] opens one and [`Trace::end`] returns the
//! closed copy that replaces it. [`TraceSummary`] aggregates a finished chain.

pub mod model;

pub use model::{Trace, TraceStatus, TraceSummary};

/// Errors from the telemetry subsystem.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Serialize a trace chain as pretty JSON for audit export.
pub fn export_json(chain: &[Trace]) -> Result<String, TelemetryError> {
    Ok(serde_json::to_string_pretty(chain)?)
}

/// Parse a trace chain previously written by [`export_json`].
pub fn import_json(json: &str) -> Result<Vec<Trace>, TelemetryError> {
    Ok(serde_json::from_str(json)?)
}
