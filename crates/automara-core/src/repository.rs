//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! require a `tenant_id` parameter to enforce data isolation.

use uuid::Uuid;

use crate::error::AutomaraResult;
use crate::models::{
    activity::{ActivityAction, ActivityLogEntry, CreateActivityLogEntry},
    credential::{StoreCredential, TenantCredential},
    tenant::{CreateTenant, Tenant, UpdateTenant},
    workflow::{CreateWorkflowInstance, CreateWorkflowTemplate, Workflow},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Tenants (global scope)
// ---------------------------------------------------------------------------

pub trait TenantRepository: Send + Sync {
    /// Create a tenant. A `parent_id` must reference an existing tenant.
    fn create(&self, input: CreateTenant) -> impl Future<Output = AutomaraResult<Tenant>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AutomaraResult<Tenant>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTenant,
    ) -> impl Future<Output = AutomaraResult<Tenant>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = AutomaraResult<PaginatedResult<Tenant>>> + Send;
    /// Direct sub-tenants of a reseller tenant.
    fn list_children(
        &self,
        parent_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = AutomaraResult<PaginatedResult<Tenant>>> + Send;
}

// ---------------------------------------------------------------------------
// Workflows (shared templates + tenant instances)
// ---------------------------------------------------------------------------

pub trait WorkflowRepository: Send + Sync {
    fn create_template(
        &self,
        input: CreateWorkflowTemplate,
    ) -> impl Future<Output = AutomaraResult<Workflow>> + Send;
    /// Insert a cloned instance, always inactive. Fails with
    /// `AlreadyExists` when the `(tenant_id, name)` unique index
    /// rejects a concurrent clone.
    fn create_instance(
        &self,
        input: CreateWorkflowInstance,
    ) -> impl Future<Output = AutomaraResult<Workflow>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AutomaraResult<Workflow>> + Send;
    fn find_instance_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> impl Future<Output = AutomaraResult<Option<Workflow>>> + Send;
    /// Flip the local activation flag. Templates are not affected.
    fn set_active(
        &self,
        id: Uuid,
        active: bool,
    ) -> impl Future<Output = AutomaraResult<Workflow>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = AutomaraResult<()>> + Send;
    fn list_templates(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = AutomaraResult<PaginatedResult<Workflow>>> + Send;
    fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = AutomaraResult<PaginatedResult<Workflow>>> + Send;
}

// ---------------------------------------------------------------------------
// Activity log (append-only, tenant-scoped)
// ---------------------------------------------------------------------------

/// Query filters for activity log entries.
#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub workflow_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub action: Option<ActivityAction>,
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    pub to: Option<chrono::DateTime<chrono::Utc>>,
}

pub trait ActivityLogRepository: Send + Sync {
    /// Append a new entry. No update or delete operations exist.
    fn append(
        &self,
        input: CreateActivityLogEntry,
    ) -> impl Future<Output = AutomaraResult<ActivityLogEntry>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        filter: ActivityLogFilter,
        pagination: Pagination,
    ) -> impl Future<Output = AutomaraResult<PaginatedResult<ActivityLogEntry>>> + Send;
}

// ---------------------------------------------------------------------------
// Credentials (tenant-scoped vault envelopes)
// ---------------------------------------------------------------------------

pub trait CredentialRepository: Send + Sync {
    /// Insert or replace the envelope for `(tenant_id, service)`.
    fn upsert(
        &self,
        input: StoreCredential,
    ) -> impl Future<Output = AutomaraResult<TenantCredential>> + Send;
    fn get(
        &self,
        tenant_id: Uuid,
        service: &str,
    ) -> impl Future<Output = AutomaraResult<TenantCredential>> + Send;
    fn delete(
        &self,
        tenant_id: Uuid,
        service: &str,
    ) -> impl Future<Output = AutomaraResult<()>> + Send;
    fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = AutomaraResult<PaginatedResult<TenantCredential>>> + Send;
}
