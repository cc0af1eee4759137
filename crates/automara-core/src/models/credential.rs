//! Stored credential domain model.
//!
//! Rows hold vault envelopes only. Plaintext secrets never reach
//! persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An encrypted credential scoped to one tenant and one external
/// service. The `(tenant_id, service)` pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCredential {
    pub id: Uuid,
    pub tenant_id: Uuid,
    /// External system the secret belongs to (e.g. `smtp`, `crm`).
    pub service: String,
    /// Versioned vault envelope, base64-encoded.
    pub encrypted_value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to store a credential envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCredential {
    pub tenant_id: Uuid,
    pub service: String,
    pub encrypted_value: String,
}
