//! Tenant domain model.
//!
//! Tenants are the customer companies of the control panel. Every
//! workflow instance, credential, and activity log entry is scoped to
//! exactly one tenant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a tenant.
///
/// Only `Active` tenants may provision workflows. `Suspended` and
/// `Archived` tenants keep their data; nothing new is provisioned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TenantStatus {
    Active,
    Suspended,
    Archived,
}

/// A customer tenant.
///
/// Tenants form a forest: a managed service provider can own
/// sub-tenants through `parent_id`. The parent link is set at creation
/// and never reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    /// Company display name, also used to derive instance names and
    /// the engine-side company tag.
    pub name: String,
    /// Parent tenant for reseller hierarchies.
    pub parent_id: Option<Uuid>,
    pub status: TenantStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    /// Must reference an existing tenant when set.
    pub parent_id: Option<Uuid>,
}

/// Fields that can be updated on an existing tenant.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub status: Option<TenantStatus>,
}
