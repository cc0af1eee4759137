//! Vault error types.

use automara_core::error::AutomaraError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("master encryption secret is not configured")]
    MissingMasterSecret,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<VaultError> for AutomaraError {
    fn from(err: VaultError) -> Self {
        AutomaraError::Crypto(err.to_string())
    }
}
