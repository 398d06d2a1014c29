use pandalive_parser::extractor::error::ExtractorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Process exit code: 2 when the room is simply offline, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Extractor(e) if e.is_not_live() => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let offline = CliError::from(ExtractorError::UserNotLive {
            channel_id: "foryoung65".to_string(),
        });
        assert_eq!(offline.exit_code(), 2);

        let invalid = CliError::from(ExtractorError::InvalidUrl("x".to_string()));
        assert_eq!(invalid.exit_code(), 1);
        assert_eq!(CliError::InvalidInput("bad".into()).exit_code(), 1);
    }
}
