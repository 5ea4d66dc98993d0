use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlayerError {
    #[error("playback session is closed")]
    SessionClosed,
    #[error("no media is loaded")]
    NothingLoaded,
    #[error("quality level {index} does not exist ({available} available)")]
    InvalidQuality { index: i32, available: usize },
    #[error("adaptive session is not active")]
    NotAdaptive,
    #[error("cannot play source: {0}")]
    UnsupportedSource(String),
    #[error("playback failed: {0}")]
    Playback(String),
    #[error("invalid manifest: {0}")]
    Manifest(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl From<url::ParseError> for PlayerError {
    fn from(err: url::ParseError) -> Self {
        PlayerError::InvalidUrl(err.to_string())
    }
}
