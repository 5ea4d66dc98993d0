use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("tls configuration error: {0}")]
    TlsError(String),
    #[error("content api error: {0}")]
    ApiError(String),
    #[error("subtitle provider error: {0}")]
    SubtitleError(String),
    #[error("unable to resolve a playable stream for `{content_id}`")]
    Unresolvable { content_id: String },
}

impl From<url::ParseError> for ResolverError {
    fn from(err: url::ParseError) -> Self {
        ResolverError::InvalidUrl(err.to_string())
    }
}
