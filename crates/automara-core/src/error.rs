//! Error types for the Automara system.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AutomaraError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// An instance already occupies the requested provisioning slot.
    /// Carries enough of the existing row for callers to surface it
    /// without a second lookup.
    #[error("Workflow '{name}' is already provisioned")]
    Conflict {
        workflow_id: Uuid,
        remote_id: Option<String>,
        name: String,
        active: bool,
    },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The remote workflow engine rejected or failed a call. `status`
    /// is the HTTP status when a response was received at all.
    #[error("Remote engine error: {message}")]
    RemoteEngine { status: Option<u16>, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AutomaraResult<T> = Result<T, AutomaraError>;
