//! Options accepted as JSON across the boundary.
//!
//! Callers pass options as a JSON string rather than marshalling a struct.
//! A NULL string means "all defaults"; every field may be omitted.

use crate::types::LogLevel;
use serde::Deserialize;

/// Options for [`crate::log_system::LogSystem`].
///
/// ```json
/// { "system_level": "Log", "forward_to_logger": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSystemOptions {
    /// Messages above this verbosity are dropped (default: `All`)
    #[serde(default = "default_system_level")]
    pub system_level: LogLevel,
    /// Mirror accepted messages to the `log` facade (default: false)
    #[serde(default)]
    pub forward_to_logger: bool,
}

fn default_system_level() -> LogLevel {
    LogLevel::All
}

impl Default for LogSystemOptions {
    fn default() -> Self {
        Self {
            system_level: default_system_level(),
            forward_to_logger: false,
        }
    }
}

impl LogSystemOptions {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
