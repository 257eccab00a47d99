// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MattermostError>;

#[derive(Error, Debug)]
pub enum MattermostError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Team ID required")]
    MissingTeam,

    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        error_id: Option<String>,
        request_id: Option<String>,
    },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("File operation failed for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MattermostError {
    /// HTTP status of the failed call, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            MattermostError::Api { status, .. } => Some(*status),
            MattermostError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(
            self,
            MattermostError::Api { .. } | MattermostError::Request(_)
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MattermostError::Io {
            path: path.into(),
            source,
        }
    }
}
