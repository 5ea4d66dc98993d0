//! Capabilities the host runtime provides to the engine.
//!
//! The engine never decodes media itself. It drives a media element, an
//! optional adaptive streaming session, an optional audio gain stage and a
//! store of transient subtitle resources, all supplied by the host.

use crate::error::PlayerError;

/// MIME type used to ask the element about native HLS support.
pub const HLS_MIME: &str = "application/vnd.apple.mpegurl";

pub trait MediaElement: Send {
    fn can_play_type(&self, mime: &str) -> bool;
    fn set_source(&mut self, url: &str);
    /// Detaches any source and stops network activity.
    fn clear_source(&mut self);
    /// Starts playback; the host may refuse (autoplay policy, decode error).
    fn play(&mut self) -> Result<(), PlayerError>;
    fn pause(&mut self);
    fn set_current_time(&mut self, seconds: f64);
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn set_playback_rate(&mut self, rate: f64);
    fn attach_text_track(&mut self, track: &TextTrack);
    fn detach_text_track(&mut self, handle: &SubtitleHandle);
}

/// Settings handed to a new adaptive session.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveConfig {
    pub back_buffer_secs: u32,
    pub enable_worker: bool,
    pub low_latency: bool,
}

pub trait AdaptiveBackend: Send {
    fn is_supported(&self) -> bool;
    fn create_session(&mut self, config: &AdaptiveConfig) -> Box<dyn AdaptiveSession>;
}

/// One adaptive streaming session bound to the media element.
pub trait AdaptiveSession: Send {
    fn load_source(&mut self, url: &str);
    fn attach_media(&mut self);
    /// Selects a level; `-1` hands selection back to the session.
    fn set_current_level(&mut self, level: i32);
    fn destroy(&mut self);
}

/// Gain stage between the media element and the audio output.
pub trait AudioGraph: Send {
    fn set_gain(&mut self, gain: f64);
    fn close(&mut self);
}

pub trait AudioGraphFactory: Send {
    /// `None` when the runtime has no audio processing support.
    fn create(&mut self) -> Option<Box<dyn AudioGraph>>;
}

/// Opaque handle of a transient subtitle resource (for example a blob URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubtitleHandle(pub String);

pub trait SubtitleResources: Send {
    fn create(&mut self, vtt: &str) -> SubtitleHandle;
    fn revoke(&mut self, handle: &SubtitleHandle);
}

/// A subtitle track as attached to the media element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTrack {
    pub handle: SubtitleHandle,
    pub label: String,
    pub language: String,
}

/// Everything the engine needs from the host.
pub struct Backends {
    pub media: Box<dyn MediaElement>,
    pub adaptive: Box<dyn AdaptiveBackend>,
    pub audio: Box<dyn AudioGraphFactory>,
    pub subtitles: Box<dyn SubtitleResources>,
}
