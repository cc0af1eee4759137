//! Workflow domain model.
//!
//! A single table holds both shared templates and per-tenant instances.
//! Templates have no owning tenant and are never active; instances
//! belong to a tenant and mirror a workflow in the remote engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A workflow template or a provisioned tenant instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: Uuid,
    /// Owning tenant; `None` for shared templates.
    pub tenant_id: Option<Uuid>,
    /// Display name. Instance names follow `"{company} - {template}"`.
    pub name: String,
    /// Whether this row is a shared template.
    pub is_template: bool,
    /// Identifier of the mirrored workflow in the remote engine.
    pub remote_id: Option<String>,
    /// Graph snapshot: nodes, connections, and settings.
    pub definition: serde_json::Value,
    /// Source template for cloned instances.
    pub template_id: Option<Uuid>,
    /// Grouping label; clones carry the company name.
    pub folder: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the instance was cloned from its template.
    pub cloned_at: Option<DateTime<Utc>>,
}

/// Fields required to register a shared template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowTemplate {
    pub name: String,
    /// Engine-side workflow this template is sourced from, if any.
    pub remote_id: Option<String>,
    /// Local graph snapshot. When absent, cloning falls back to a
    /// fresh read from the engine via `remote_id`.
    pub definition: Option<serde_json::Value>,
}

/// Fields required to insert a cloned tenant instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowInstance {
    pub tenant_id: Uuid,
    pub template_id: Uuid,
    pub name: String,
    pub remote_id: String,
    pub folder: Option<String>,
    pub definition: serde_json::Value,
}
