use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("request failed with HTTP {status} for {url}")]
    HttpStatus { status: StatusCode, url: String },
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("hls playlist error: {0}")]
    HlsPlaylistError(String),
    #[error("{channel_id} is not currently live")]
    UserNotLive { channel_id: String },
    #[error("no hls manifest found for {channel_id}")]
    ManifestNotFound { channel_id: String },
    #[error("unsupported extractor")]
    UnsupportedExtractor,
    #[error("other: {0}")]
    Other(String),
}

impl ExtractorError {
    /// The channel exists but is not broadcasting. Batch callers usually skip
    /// these instead of aborting.
    pub fn is_not_live(&self) -> bool {
        matches!(self, ExtractorError::UserNotLive { .. })
    }

    /// HTTP status attached to the error, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ExtractorError::HttpStatus { status, .. } => Some(*status),
            ExtractorError::HttpError(e) => e.status(),
            _ => None,
        }
    }
}
