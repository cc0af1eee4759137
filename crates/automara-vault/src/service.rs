//! Credential service: store, reveal, and remove tenant secrets.

use automara_core::error::{AutomaraError, AutomaraResult};
use automara_core::models::credential::{StoreCredential, TenantCredential};
use automara_core::repository::{CredentialRepository, PaginatedResult, Pagination};
use tracing::warn;
use uuid::Uuid;

use crate::envelope::CredentialVault;

/// Credential service.
///
/// Generic over the repository implementation so that the vault
/// layer has no dependency on the database crate.
pub struct CredentialService<R: CredentialRepository> {
    repo: R,
    vault: CredentialVault,
}

impl<R: CredentialRepository> CredentialService<R> {
    pub fn new(repo: R, vault: CredentialVault) -> Self {
        Self { repo, vault }
    }

    /// Seal a secret and store it under `(tenant_id, service)`,
    /// replacing any previous value for that pair.
    ///
    /// The returned record carries the envelope, never the plaintext.
    pub async fn store(
        &self,
        tenant_id: Uuid,
        service: &str,
        secret: &str,
    ) -> AutomaraResult<TenantCredential> {
        if service.is_empty() {
            return Err(AutomaraError::Validation {
                message: "service name is required".into(),
            });
        }
        if secret.is_empty() {
            return Err(AutomaraError::Validation {
                message: "credential value is required".into(),
            });
        }

        let encrypted_value = self
            .vault
            .encrypt(secret)
            .ok_or_else(|| AutomaraError::Crypto("credential encryption failed".into()))?;

        self.repo
            .upsert(StoreCredential {
                tenant_id,
                service: service.to_string(),
                encrypted_value,
            })
            .await
    }

    /// Open the stored envelope for `(tenant_id, service)`.
    ///
    /// A missing credential is an error; an unreadable envelope
    /// (tampered, or sealed under a different master secret) yields
    /// `Ok(None)` so one bad row never poisons the caller.
    pub async fn reveal(&self, tenant_id: Uuid, service: &str) -> AutomaraResult<Option<String>> {
        let credential = self.repo.get(tenant_id, service).await?;

        match self.vault.decrypt(&credential.encrypted_value) {
            Some(plaintext) => Ok(Some(plaintext)),
            None => {
                warn!(%tenant_id, service, "Stored credential envelope is unreadable");
                Ok(None)
            }
        }
    }

    /// Remove the `(tenant_id, service)` credential.
    pub async fn remove(&self, tenant_id: Uuid, service: &str) -> AutomaraResult<()> {
        self.repo.delete(tenant_id, service).await
    }

    /// List a tenant's stored credentials. Values stay sealed;
    /// listing never decrypts.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> AutomaraResult<PaginatedResult<TenantCredential>> {
        self.repo.list(tenant_id, pagination).await
    }
}
