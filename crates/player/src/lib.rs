//! Playback session engine for resolved streams.
//!
//! [`PlaybackEngine`] drives host-provided capabilities ([`backend::Backends`]):
//! an adaptive streaming session for HLS manifests, native playback otherwise,
//! a gain stage for volume above 100% and transient subtitle resources.

pub mod backend;
pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod quality;
pub mod shortcuts;
pub mod state;
pub mod subtitle;
pub mod volume;

pub use config::PlayerConfig;
pub use engine::{AdaptiveEvent, MediaEvent, PlaybackEngine};
pub use error::PlayerError;
pub use quality::{AUTO_QUALITY, QualityLevel};
pub use state::{PlaybackSnapshot, PlaybackState, SessionId};
