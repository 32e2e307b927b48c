//! Runtime configuration.
//!
//! Defaults match the cadence the source board needs: drag animations fire a
//! burst of changes well inside 120ms, and a half-second poll catches anything
//! the change signals missed.

use crate::error::ConfigError;
use crate::types::Orientation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_QUIESCENCE_MS: u64 = 120;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Quiet time after the last change signal before a cycle runs
    pub quiescence_ms: u64,
    /// Fixed cadence of the fallback poll
    pub poll_interval_ms: u64,
    /// Orientation to hold on the mirror; `None` reads it from the mirror itself
    pub start_orientation: Option<Orientation>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            quiescence_ms: DEFAULT_QUIESCENCE_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            start_orientation: None,
        }
    }
}

impl MirrorConfig {
    /// Load from a JSON file; absent keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_millis(self.quiescence_ms)
    }

    /// Poll cadence, never zero (tokio intervals panic on a zero period)
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
