//! Error types for the mirroring engine
//!
//! None of these stop observation: each failure has a degraded path and the
//! next observation cycle is the only retry.

use crate::types::PlacementParseError;
use thiserror::Error;

/// A position string that can't be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedPositionError {
    /// Fewer than the two mandatory fields (placement and side to move)
    #[error("position has {found} field(s), need at least 2")]
    TooFewFields { found: usize },

    #[error("bad placement field: {0}")]
    Placement(#[from] PlacementParseError),

    #[error("bad side-to-move field '{0}'")]
    SideToMove(String),

    #[error("bad full-move number '{0}'")]
    FullMove(String),
}

/// Delivery failures between page contexts
#[derive(Error, Debug)]
pub enum TransportError {
    /// No mirror surface is present to receive the message
    #[error("no mirror target reachable: {reason}")]
    TargetUnreachable { reason: String },

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures driving the mirror surface
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("mirror board not found")]
    BoardMissing,

    #[error("position input not found")]
    PositionInputMissing,

    #[error("bad move text '{0}'")]
    BadMove(String),

    #[error("bad position: {0}")]
    BadPosition(#[from] MalformedPositionError),
}

/// Configuration loading failures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;
pub type MirrorResult<T> = Result<T, MirrorError>;
