//! Activity log domain model.
//!
//! Every workflow lifecycle transition appends one entry. Entries are
//! never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle transition recorded by an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityAction {
    Activated,
    Deactivated,
    Deleted,
}

/// An append-only record of a workflow lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub workflow_id: Uuid,
    /// User that triggered the transition.
    pub actor_id: Uuid,
    pub action: ActivityAction,
    /// Structured context: instance name, remote id, and similar.
    pub detail: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fields required to append a new entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActivityLogEntry {
    pub tenant_id: Uuid,
    pub workflow_id: Uuid,
    pub actor_id: Uuid,
    pub action: ActivityAction,
    pub detail: Option<serde_json::Value>,
}
