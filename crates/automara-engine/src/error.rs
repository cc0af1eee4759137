//! Remote engine error types.

use automara_core::error::AutomaraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("engine API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl From<EngineError> for AutomaraError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Api { status, message } => AutomaraError::RemoteEngine {
                status: Some(status),
                message,
            },
            EngineError::Transport(e) => AutomaraError::RemoteEngine {
                status: None,
                message: e.to_string(),
            },
        }
    }
}
