use crate::config::default_max_recording_seconds;

use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Input device name (None = default microphone).
    #[serde(default)]
    pub input_device: Option<String>,
    /// Output device name (None = default output).
    #[serde(default)]
    pub output_device: Option<String>,
    /// Longest capture kept; older audio is dropped beyond this.
    #[serde(default = "default_max_recording_seconds")]
    pub max_recording_seconds: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: None,
            output_device: None,
            max_recording_seconds: default_max_recording_seconds(),
        }
    }
}
