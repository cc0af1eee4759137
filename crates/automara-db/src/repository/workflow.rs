//! SurrealDB implementation of [`WorkflowRepository`].

use automara_core::error::AutomaraResult;
use automara_core::models::workflow::{CreateWorkflowInstance, CreateWorkflowTemplate, Workflow};
use automara_core::repository::{PaginatedResult, Pagination, WorkflowRepository};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::{DbError, is_unique_violation};

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct WorkflowRow {
    tenant_id: Option<String>,
    name: String,
    is_template: bool,
    remote_id: Option<String>,
    definition: serde_json::Value,
    template_id: Option<String>,
    folder: Option<String>,
    active: bool,
    created_at: Datetime,
    updated_at: Datetime,
    cloned_at: Option<Datetime>,
}

impl WorkflowRow {
    fn into_workflow(self, id: Uuid) -> Result<Workflow, DbError> {
        let tenant_id = parse_opt_uuid(self.tenant_id, "tenant")?;
        let template_id = parse_opt_uuid(self.template_id, "template")?;
        Ok(Workflow {
            id,
            tenant_id,
            name: self.name,
            is_template: self.is_template,
            remote_id: self.remote_id,
            definition: self.definition,
            template_id,
            folder: self.folder,
            active: self.active,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
            cloned_at: self.cloned_at.map(|d| d.0),
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct WorkflowRowWithId {
    record_id: String,
    tenant_id: Option<String>,
    name: String,
    is_template: bool,
    remote_id: Option<String>,
    definition: serde_json::Value,
    template_id: Option<String>,
    folder: Option<String>,
    active: bool,
    created_at: Datetime,
    updated_at: Datetime,
    cloned_at: Option<Datetime>,
}

impl WorkflowRowWithId {
    fn try_into_workflow(self) -> Result<Workflow, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::InvalidRow(format!("invalid UUID: {e}")))?;
        let tenant_id = parse_opt_uuid(self.tenant_id, "tenant")?;
        let template_id = parse_opt_uuid(self.template_id, "template")?;
        Ok(Workflow {
            id,
            tenant_id,
            name: self.name,
            is_template: self.is_template,
            remote_id: self.remote_id,
            definition: self.definition,
            template_id,
            folder: self.folder,
            active: self.active,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
            cloned_at: self.cloned_at.map(|d| d.0),
        })
    }
}

fn parse_opt_uuid(raw: Option<String>, label: &str) -> Result<Option<Uuid>, DbError> {
    raw.map(|v| Uuid::parse_str(&v))
        .transpose()
        .map_err(|e| DbError::InvalidRow(format!("invalid {label} UUID: {e}")))
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Workflow repository.
#[derive(Clone)]
pub struct SurrealWorkflowRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkflowRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> WorkflowRepository for SurrealWorkflowRepository<C> {
    async fn create_template(&self, input: CreateWorkflowTemplate) -> AutomaraResult<Workflow> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let definition = input.definition.unwrap_or_else(empty_object);

        let result = self
            .db
            .query(
                "CREATE type::thing('workflow', $id) SET \
                 tenant_id = NONE, \
                 name = $name, \
                 is_template = true, \
                 remote_id = $remote_id, \
                 definition = $definition, \
                 template_id = NONE, \
                 folder = NONE, \
                 active = false, \
                 cloned_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("remote_id", input.remote_id))
            .bind(("definition", definition))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => {
                return Err(DbError::Duplicate {
                    entity: "workflow".into(),
                }
                .into());
            }
            Err(e) => return Err(DbError::Query(e.to_string()).into()),
        };

        let rows: Vec<WorkflowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workflow".into(),
            id: id_str,
        })?;

        Ok(row.into_workflow(id)?)
    }

    async fn create_instance(&self, input: CreateWorkflowInstance) -> AutomaraResult<Workflow> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('workflow', $id) SET \
                 tenant_id = $tenant_id, \
                 name = $name, \
                 is_template = false, \
                 remote_id = $remote_id, \
                 definition = $definition, \
                 template_id = $template_id, \
                 folder = $folder, \
                 active = false, \
                 cloned_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("name", input.name))
            .bind(("remote_id", input.remote_id))
            .bind(("definition", input.definition))
            .bind(("template_id", input.template_id.to_string()))
            .bind(("folder", input.folder))
            .await
            .map_err(DbError::from)?;

        // The (tenant_id, name) unique index is the cross-process
        // guard against concurrent clones of the same template.
        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => {
                return Err(DbError::Duplicate {
                    entity: "workflow".into(),
                }
                .into());
            }
            Err(e) => return Err(DbError::Query(e.to_string()).into()),
        };

        let rows: Vec<WorkflowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workflow".into(),
            id: id_str,
        })?;

        Ok(row.into_workflow(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> AutomaraResult<Workflow> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('workflow', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkflowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workflow".into(),
            id: id_str,
        })?;

        Ok(row.into_workflow(id)?)
    }

    async fn find_instance_by_name(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> AutomaraResult<Option<Workflow>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM workflow \
                 WHERE tenant_id = $tenant_id \
                 AND name = $name \
                 AND is_template = false",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkflowRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_workflow().map_err(Into::into))
            .transpose()
    }

    async fn set_active(&self, id: Uuid, active: bool) -> AutomaraResult<Workflow> {
        let id_str = id.to_string();

        // Templates never carry activation state.
        let result = self
            .db
            .query(
                "UPDATE type::thing('workflow', $id) SET \
                 active = $active, \
                 updated_at = time::now() \
                 WHERE is_template = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("active", active))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<WorkflowRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "workflow".into(),
            id: id_str,
        })?;

        Ok(row.into_workflow(id)?)
    }

    async fn delete(&self, id: Uuid) -> AutomaraResult<()> {
        self.db
            .query("DELETE type::thing('workflow', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_templates(
        &self,
        pagination: Pagination,
    ) -> AutomaraResult<PaginatedResult<Workflow>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM workflow \
                 WHERE is_template = true GROUP ALL",
            )
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM workflow \
                 WHERE is_template = true \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkflowRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_workflow())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_by_tenant(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> AutomaraResult<PaginatedResult<Workflow>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM workflow \
                 WHERE tenant_id = $tenant_id GROUP ALL",
            )
            .bind(("tenant_id", tenant_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM workflow \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkflowRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_workflow())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
