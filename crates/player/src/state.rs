use std::fmt;

use serde::Serialize;

use crate::quality::{AUTO_QUALITY, QualityLevel};

/// Identifies one manifest load. Events from older loads are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    /// Waiting for data; returns to playing or paused once it arrives.
    Buffering { resume_playing: bool },
    Error,
    Closed,
}

impl PlaybackState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackState::Error | PlaybackState::Closed)
    }

    pub fn is_playing(&self) -> bool {
        matches!(
            self,
            PlaybackState::Playing
                | PlaybackState::Buffering {
                    resume_playing: true
                }
        )
    }
}

/// Point-in-time view of a playback session for the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub session: Option<SessionId>,
    pub state: PlaybackState,
    pub current_time: f64,
    pub duration: f64,
    pub buffered_end: f64,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub has_error: bool,
    pub error: Option<String>,
    pub quality_levels: Vec<QualityLevel>,
    pub current_quality: i32,
    pub subtitle_label: Option<String>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            session: None,
            state: PlaybackState::Idle,
            current_time: 0.0,
            duration: 0.0,
            buffered_end: 0.0,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            is_playing: false,
            is_buffering: false,
            has_error: false,
            error: None,
            quality_levels: Vec::new(),
            current_quality: AUTO_QUALITY,
            subtitle_label: None,
        }
    }
}
