use filmy_player::PlayerError;
use filmy_resolver::ResolverError;
use filmy_resolver::capture::CaptureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Player error: {0}")]
    Player(#[from] PlayerError),

    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
