//! Automara Vault: credential envelope encryption, payload signing,
//! and opaque token generation.

pub mod envelope;
pub mod error;
pub mod service;
pub mod signing;
pub mod token;

pub use envelope::CredentialVault;
pub use error::VaultError;
pub use service::CredentialService;
pub use signing::{sign_json, sign_payload, verify_signature};
pub use token::{DEFAULT_TOKEN_BYTES, generate_token};
