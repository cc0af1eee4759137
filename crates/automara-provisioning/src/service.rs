//! Workflow provisioning: cloning templates onto the remote engine
//! and driving the activate/deactivate/delete lifecycle.

use automara_core::RequestContext;
use automara_core::error::{AutomaraError, AutomaraResult};
use automara_core::models::activity::{ActivityAction, CreateActivityLogEntry};
use automara_core::models::tenant::TenantStatus;
use automara_core::models::workflow::{CreateWorkflowInstance, Workflow};
use automara_core::repository::{ActivityLogRepository, TenantRepository, WorkflowRepository};
use automara_engine::{EngineClient, EngineError, EngineTag, NewEngineWorkflow};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::locks::TenantLocks;

/// Outcome of a successful activation.
#[derive(Debug, Clone)]
pub struct ActivationOutput {
    /// Local workflow row id.
    pub workflow_id: Uuid,
    /// Engine-side workflow id.
    pub remote_id: String,
    /// Instance name (`"{company} - {template}"`).
    pub name: String,
    pub active: bool,
}

/// Instance naming scheme shared by clone and duplicate checks.
fn instance_name(company: &str, template: &str) -> String {
    format!("{company} - {template}")
}

/// Conflict error carrying the state of the instance that is already
/// provisioned.
fn conflict(existing: &Workflow) -> AutomaraError {
    AutomaraError::Conflict {
        workflow_id: existing.id,
        remote_id: existing.remote_id.clone(),
        name: existing.name.clone(),
        active: existing.active,
    }
}

fn remote_failure(operation: &str, err: EngineError) -> AutomaraError {
    warn!(error = %err, "{operation} failed");
    err.into()
}

/// Workflow provisioning service.
///
/// Generic over the repositories and the engine client so the
/// orchestration logic is testable without a live engine.
pub struct ProvisioningService<T, W, L, E>
where
    T: TenantRepository,
    W: WorkflowRepository,
    L: ActivityLogRepository,
    E: EngineClient,
{
    tenant_repo: T,
    workflow_repo: W,
    activity_repo: L,
    engine: E,
    locks: TenantLocks,
}

impl<T, W, L, E> ProvisioningService<T, W, L, E>
where
    T: TenantRepository,
    W: WorkflowRepository,
    L: ActivityLogRepository,
    E: EngineClient,
{
    pub fn new(tenant_repo: T, workflow_repo: W, activity_repo: L, engine: E) -> Self {
        Self {
            tenant_repo,
            workflow_repo,
            activity_repo,
            engine,
            locks: TenantLocks::default(),
        }
    }

    /// Activate a workflow for the acting tenant.
    ///
    /// Given a template id this clones it onto the engine under the
    /// tenant's name and activates the clone. Given an instance id it
    /// resumes that instance, so reactivation and retry-after-crash
    /// share one path.
    pub async fn activate(
        &self,
        workflow_id: Uuid,
        ctx: &RequestContext,
    ) -> AutomaraResult<ActivationOutput> {
        // 1. The acting tenant must exist and be active.
        let tenant = self.tenant_repo.get_by_id(ctx.tenant_id).await?;
        if tenant.status != TenantStatus::Active {
            return Err(AutomaraError::Validation {
                message: format!("tenant '{}' is not active", tenant.name),
            });
        }

        // 2. Template or instance decides the path. A resume
        //    serializes on the instance's owning tenant and re-reads
        //    under that lock so the active check is current.
        let workflow = self.workflow_repo.get_by_id(workflow_id).await?;
        if !workflow.is_template {
            let owner = owning_tenant(&workflow)?;
            let _guard = self.locks.acquire(owner).await;
            let instance = self.workflow_repo.get_by_id(workflow_id).await?;
            return self.resume_instance(instance, ctx).await;
        }

        // 3. Check-and-clone runs under the acting tenant's lock
        //    within the process; the (tenant_id, name) unique index
        //    closes the race across processes.
        let _guard = self.locks.acquire(ctx.tenant_id).await;

        // 4. Duplicate check under the computed instance name.
        let name = instance_name(&tenant.name, &workflow.name);
        if let Some(existing) = self
            .workflow_repo
            .find_instance_by_name(ctx.tenant_id, &name)
            .await?
        {
            if existing.active {
                return Err(conflict(&existing));
            }
            // An inactive twin is a deactivated or half-provisioned
            // earlier clone. Resume it instead of cloning again.
            return self.resume_instance(existing, ctx).await;
        }

        // 5. The company tag groups clones on the engine; create it
        //    on first use.
        let company_tag = self.ensure_tag(&tenant.name).await?;

        // 6. Resolve the graph to clone.
        let definition = self.template_definition(&workflow).await?;

        // 7. Clone onto the engine, tagged at creation. Failure here
        //    leaves no local trace.
        let created = self
            .engine
            .create_workflow(NewEngineWorkflow {
                name: name.clone(),
                nodes: definition.get("nodes").cloned().unwrap_or(json!([])),
                connections: definition.get("connections").cloned().unwrap_or(json!({})),
                settings: definition.get("settings").cloned().unwrap_or(json!({})),
                tags: vec![company_tag.name, tenant.id.to_string()],
                active: false,
            })
            .await
            .map_err(|e| remote_failure("remote workflow creation", e))?;

        // 8. Record the instance locally, still inactive.
        let instance = match self
            .workflow_repo
            .create_instance(CreateWorkflowInstance {
                tenant_id: ctx.tenant_id,
                template_id: workflow.id,
                name: name.clone(),
                remote_id: created.id.clone(),
                folder: Some(tenant.name.clone()),
                definition: json!({
                    "nodes": created.nodes,
                    "connections": created.connections,
                    "settings": created.settings,
                }),
            })
            .await
        {
            Ok(instance) => instance,
            Err(AutomaraError::AlreadyExists { .. }) => {
                // A concurrent activation in another process won the
                // race; the clone created above has no local row.
                warn!(
                    remote_id = %created.id,
                    "Concurrent activation won; remote clone is orphaned"
                );
                let winner = self
                    .workflow_repo
                    .find_instance_by_name(ctx.tenant_id, &name)
                    .await?
                    .ok_or_else(|| {
                        AutomaraError::Internal(
                            "duplicate instance vanished after conflict".into(),
                        )
                    })?;
                return Err(conflict(&winner));
            }
            Err(e) => return Err(e),
        };

        // 9. Activate remotely first; the local flag flips only after
        //    the engine confirmed. On failure the inactive row stays
        //    behind and a later activate resumes it.
        self.engine
            .set_workflow_active(&created.id, true)
            .await
            .map_err(|e| remote_failure("remote workflow activation", e))?;
        let instance = self.workflow_repo.set_active(instance.id, true).await?;

        // 10. The trail entry never undoes a completed activation.
        self.log_activity(
            ctx.tenant_id,
            ctx,
            instance.id,
            ActivityAction::Activated,
            json!({
                "template_id": workflow.id,
                "remote_id": created.id.clone(),
                "name": instance.name.clone(),
            }),
        )
        .await;

        info!(workflow_id = %instance.id, remote_id = %created.id, "Workflow activated");

        Ok(ActivationOutput {
            workflow_id: instance.id,
            remote_id: created.id,
            name: instance.name,
            active: instance.active,
        })
    }

    /// Deactivate an instance. Remote first; the local flag only
    /// flips after the engine confirmed, never the reverse order.
    pub async fn deactivate(&self, workflow_id: Uuid, ctx: &RequestContext) -> AutomaraResult<()> {
        let workflow = self.workflow_repo.get_by_id(workflow_id).await?;
        if workflow.is_template {
            return Err(AutomaraError::Validation {
                message: "template workflows have no activation state".into(),
            });
        }
        let owner = owning_tenant(&workflow)?;
        self.authorize(owner, ctx)?;

        let remote_id = match workflow.remote_id.clone() {
            Some(remote_id) => remote_id,
            None => {
                return Err(AutomaraError::Validation {
                    message: format!("workflow '{}' has no remote engine id", workflow.name),
                });
            }
        };

        self.engine
            .set_workflow_active(&remote_id, false)
            .await
            .map_err(|e| remote_failure("remote workflow deactivation", e))?;
        self.workflow_repo.set_active(workflow.id, false).await?;

        self.log_activity(
            owner,
            ctx,
            workflow.id,
            ActivityAction::Deactivated,
            json!({
                "remote_id": remote_id,
                "name": workflow.name,
            }),
        )
        .await;

        info!(%workflow_id, "Workflow deactivated");
        Ok(())
    }

    /// Delete an instance everywhere: engine first, then the activity
    /// trail, then the local row.
    pub async fn delete(&self, workflow_id: Uuid, ctx: &RequestContext) -> AutomaraResult<()> {
        let workflow = self.workflow_repo.get_by_id(workflow_id).await?;
        if workflow.is_template {
            return Err(AutomaraError::Validation {
                message: format!(
                    "workflow '{}' is a template and cannot be deleted",
                    workflow.name
                ),
            });
        }
        let owner = owning_tenant(&workflow)?;
        self.authorize(owner, ctx)?;

        // Any remote failure aborts with the local row intact.
        if let Some(remote_id) = workflow.remote_id.clone() {
            self.engine
                .delete_workflow(&remote_id)
                .await
                .map_err(|e| remote_failure("remote workflow deletion", e))?;
        }

        // The trail entry lands before the row disappears; a failed
        // append aborts the delete.
        self.activity_repo
            .append(CreateActivityLogEntry {
                tenant_id: owner,
                workflow_id: workflow.id,
                actor_id: ctx.actor_id,
                action: ActivityAction::Deleted,
                detail: Some(json!({
                    "name": workflow.name,
                    "remote_id": workflow.remote_id,
                })),
            })
            .await?;

        self.workflow_repo.delete(workflow.id).await?;

        info!(%workflow_id, "Workflow deleted");
        Ok(())
    }

    /// Resume path: an existing instance is (re)activated by its
    /// stored remote id. The stored graph is not re-synced; the
    /// engine copy is authoritative once cloned.
    async fn resume_instance(
        &self,
        instance: Workflow,
        ctx: &RequestContext,
    ) -> AutomaraResult<ActivationOutput> {
        let owner = owning_tenant(&instance)?;
        self.authorize(owner, ctx)?;

        if instance.active {
            return Err(conflict(&instance));
        }

        let remote_id = match instance.remote_id.clone() {
            Some(remote_id) => remote_id,
            None => {
                return Err(AutomaraError::Validation {
                    message: format!("workflow '{}' has no remote engine id", instance.name),
                });
            }
        };

        self.engine
            .set_workflow_active(&remote_id, true)
            .await
            .map_err(|e| remote_failure("remote workflow activation", e))?;
        let instance = self.workflow_repo.set_active(instance.id, true).await?;

        self.log_activity(
            owner,
            ctx,
            instance.id,
            ActivityAction::Activated,
            json!({
                "remote_id": remote_id.clone(),
                "name": instance.name.clone(),
            }),
        )
        .await;

        info!(workflow_id = %instance.id, %remote_id, "Workflow reactivated");

        Ok(ActivationOutput {
            workflow_id: instance.id,
            remote_id,
            name: instance.name,
            active: instance.active,
        })
    }

    /// Find the company tag on the engine, creating it when missing.
    async fn ensure_tag(&self, company: &str) -> AutomaraResult<EngineTag> {
        let tags = self
            .engine
            .list_tags()
            .await
            .map_err(|e| remote_failure("remote tag listing", e))?;
        if let Some(tag) = tags.into_iter().find(|t| t.name == company) {
            return Ok(tag);
        }
        self.engine
            .create_tag(company)
            .await
            .map_err(|e| remote_failure("remote tag creation", e))
    }

    /// The graph to clone: the local snapshot when present, otherwise
    /// fetched fresh from the engine.
    async fn template_definition(&self, template: &Workflow) -> AutomaraResult<serde_json::Value> {
        if template
            .definition
            .as_object()
            .is_some_and(|graph| !graph.is_empty())
        {
            return Ok(template.definition.clone());
        }

        let remote_id = match template.remote_id.as_deref() {
            Some(remote_id) => remote_id,
            None => {
                return Err(AutomaraError::Validation {
                    message: format!(
                        "template '{}' has no graph snapshot and no remote engine id",
                        template.name
                    ),
                });
            }
        };

        let remote = self
            .engine
            .get_workflow(remote_id)
            .await
            .map_err(|e| remote_failure("remote template fetch", e))?;

        Ok(json!({
            "nodes": remote.nodes,
            "connections": remote.connections,
            "settings": remote.settings,
        }))
    }

    fn authorize(&self, owner: Uuid, ctx: &RequestContext) -> AutomaraResult<()> {
        if ctx.can_act_on(owner) {
            Ok(())
        } else {
            Err(AutomaraError::AuthorizationDenied {
                reason: "workflow belongs to another tenant".into(),
            })
        }
    }

    /// Append a trail entry under the owning tenant; failures are
    /// logged and swallowed.
    async fn log_activity(
        &self,
        tenant_id: Uuid,
        ctx: &RequestContext,
        workflow_id: Uuid,
        action: ActivityAction,
        detail: serde_json::Value,
    ) {
        let entry = CreateActivityLogEntry {
            tenant_id,
            workflow_id,
            actor_id: ctx.actor_id,
            action,
            detail: Some(detail),
        };
        if let Err(e) = self.activity_repo.append(entry).await {
            warn!(error = %e, %workflow_id, "Activity log append failed");
        }
    }
}

/// Instances always carry their owner; a row without one is corrupt.
fn owning_tenant(workflow: &Workflow) -> AutomaraResult<Uuid> {
    workflow.tenant_id.ok_or_else(|| {
        AutomaraError::Internal(format!("instance '{}' has no tenant", workflow.name))
    })
}
