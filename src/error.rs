//! Error types
//!
//! Nothing in the per-tick simulation path is fatal. These types cover
//! tuning file loading and the best-effort respawn collaborator.

use std::path::PathBuf;

use thiserror::Error;

/// Failure loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure reported by a respawn collaborator
///
/// The supervisor logs these and carries on; they never reach the frame loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RespawnError {
    #[error("respawn failed: {0}")]
    Failed(String),
}
