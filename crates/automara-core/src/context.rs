//! Request context carried through tenant-scoped operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Acting role for an operation.
///
/// `Admin` is confined to the tenant in its context; `GlobalAdmin` may
/// operate on resources owned by any tenant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Admin,
    GlobalAdmin,
}

/// Immutable per-request context.
///
/// Built once at the request boundary and passed by reference into the
/// service layer. There is no ambient request state anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Tenant on whose behalf the operation runs.
    pub tenant_id: Uuid,
    /// Authenticated acting user, recorded in activity log entries.
    pub actor_id: Uuid,
    pub role: Role,
}

impl RequestContext {
    pub fn new(tenant_id: Uuid, actor_id: Uuid, role: Role) -> Self {
        Self {
            tenant_id,
            actor_id,
            role,
        }
    }

    /// Whether this context may act on resources owned by `tenant_id`.
    pub fn can_act_on(&self, tenant_id: Uuid) -> bool {
        self.role == Role::GlobalAdmin || self.tenant_id == tenant_id
    }
}
