//! Per-instance logging switches.

use serde::{Deserialize, Serialize};

/// Controls which diagnostic messages a preprocessor emits.
///
/// The switches live on the instance that owns them, so two preprocessors in
/// the same process can log differently. Debug-level events are left to the
/// `tracing` subscriber filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Emit info-level events (per-call batch summaries).
    pub enable_info: bool,
    /// Emit warn-level events (suspicious but accepted input).
    pub enable_warning: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable_info: true,
            enable_warning: true,
        }
    }
}

impl LogConfig {
    /// Disables every switch.
    pub fn silent() -> Self {
        Self {
            enable_info: false,
            enable_warning: false,
        }
    }
}
