//! Player configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Seconds of already-played media the adaptive session keeps buffered.
    pub back_buffer_secs: u32,
    /// Let the adaptive session parse off the main thread.
    pub enable_worker: bool,
    pub low_latency: bool,
    /// Start playing as soon as the manifest is parsed.
    pub autoplay: bool,
    pub controls_hide_ms: u64,
    pub seek_step_secs: f64,
    pub volume_step: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            back_buffer_secs: 90,
            enable_worker: true,
            low_latency: false,
            autoplay: true,
            controls_hide_ms: 3_000,
            seek_step_secs: 10.0,
            volume_step: 0.05,
        }
    }
}

impl PlayerConfig {
    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_ms)
    }
}
