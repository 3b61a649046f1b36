//! Error types for the gate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while loading questions or settings.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question source contains no questions")]
    Empty,
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors returned by gate operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The user failed too often; present `remaining` before they may retry.
    #[error("gate is locked for another {}s", .remaining.as_secs())]
    LockedOut { remaining: Duration },
    #[error("no active question")]
    NoQuestion,
    #[error("cannot draw {needed} unique decoys for {correct} from [{low}, {high}]")]
    InsufficientDecoys {
        correct: i64,
        low: i64,
        high: i64,
        needed: usize,
    },
    #[error("unknown target {0}")]
    UnknownTarget(u32),
}

/// Errors from a lockout store. Logged by the gate, never surfaced.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
