//! SurrealDB implementation of [`ActivityLogRepository`].
//!
//! The `activity_log` table is append-only; this repository exposes no
//! update or delete path and the table denies both at the schema level.

use automara_core::error::AutomaraResult;
use automara_core::models::activity::{ActivityAction, ActivityLogEntry, CreateActivityLogEntry};
use automara_core::repository::{
    ActivityLogFilter, ActivityLogRepository, PaginatedResult, Pagination,
};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::DbError;

fn action_to_string(action: ActivityAction) -> &'static str {
    match action {
        ActivityAction::Activated => "Activated",
        ActivityAction::Deactivated => "Deactivated",
        ActivityAction::Deleted => "Deleted",
    }
}

fn parse_action(raw: &str) -> Result<ActivityAction, DbError> {
    match raw {
        "Activated" => Ok(ActivityAction::Activated),
        "Deactivated" => Ok(ActivityAction::Deactivated),
        "Deleted" => Ok(ActivityAction::Deleted),
        other => Err(DbError::InvalidRow(format!(
            "unknown activity action: {other}"
        ))),
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct ActivityRow {
    tenant_id: String,
    workflow_id: String,
    actor_id: String,
    action: String,
    detail: serde_json::Value,
    created_at: Datetime,
}

impl ActivityRow {
    fn into_entry(self, id: Uuid) -> Result<ActivityLogEntry, DbError> {
        Ok(ActivityLogEntry {
            id,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            workflow_id: parse_uuid(&self.workflow_id, "workflow")?,
            actor_id: parse_uuid(&self.actor_id, "actor")?,
            action: parse_action(&self.action)?,
            detail: self.detail,
            created_at: self.created_at.0,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct ActivityRowWithId {
    record_id: String,
    tenant_id: String,
    workflow_id: String,
    actor_id: String,
    action: String,
    detail: serde_json::Value,
    created_at: Datetime,
}

impl ActivityRowWithId {
    fn try_into_entry(self) -> Result<ActivityLogEntry, DbError> {
        Ok(ActivityLogEntry {
            id: parse_uuid(&self.record_id, "entry")?,
            tenant_id: parse_uuid(&self.tenant_id, "tenant")?,
            workflow_id: parse_uuid(&self.workflow_id, "workflow")?,
            actor_id: parse_uuid(&self.actor_id, "actor")?,
            action: parse_action(&self.action)?,
            detail: self.detail,
            created_at: self.created_at.0,
        })
    }
}

fn parse_uuid(raw: &str, label: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::InvalidRow(format!("invalid {label} UUID: {e}")))
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

/// SurrealDB implementation of the ActivityLog repository.
#[derive(Clone)]
pub struct SurrealActivityLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActivityLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    fn filter_clause(filter: &ActivityLogFilter) -> String {
        let mut conditions = vec!["tenant_id = $tenant_id"];
        if filter.workflow_id.is_some() {
            conditions.push("workflow_id = $workflow_id");
        }
        if filter.actor_id.is_some() {
            conditions.push("actor_id = $actor_id");
        }
        if filter.action.is_some() {
            conditions.push("action = $action");
        }
        if filter.from.is_some() {
            conditions.push("created_at >= $from");
        }
        if filter.to.is_some() {
            conditions.push("created_at <= $to");
        }
        conditions.join(" AND ")
    }
}

fn bind_filter<'r, C: Connection>(
    mut query: surrealdb::method::Query<'r, C>,
    filter: &ActivityLogFilter,
) -> surrealdb::method::Query<'r, C> {
    if let Some(workflow_id) = filter.workflow_id {
        query = query.bind(("workflow_id", workflow_id.to_string()));
    }
    if let Some(actor_id) = filter.actor_id {
        query = query.bind(("actor_id", actor_id.to_string()));
    }
    if let Some(action) = filter.action {
        query = query.bind(("action", action_to_string(action)));
    }
    if let Some(from) = filter.from {
        query = query.bind(("from", Datetime::from(from)));
    }
    if let Some(to) = filter.to {
        query = query.bind(("to", Datetime::from(to)));
    }
    query
}

impl<C: Connection> ActivityLogRepository for SurrealActivityLogRepository<C> {
    async fn append(&self, input: CreateActivityLogEntry) -> AutomaraResult<ActivityLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let detail = input.detail.unwrap_or_else(empty_object);

        let result = self
            .db
            .query(
                "CREATE type::thing('activity_log', $id) SET \
                 tenant_id = $tenant_id, \
                 workflow_id = $workflow_id, \
                 actor_id = $actor_id, \
                 action = $action, \
                 detail = $detail",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("workflow_id", input.workflow_id.to_string()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("action", action_to_string(input.action)))
            .bind(("detail", detail))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ActivityRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "activity_log".into(),
            id: id_str,
        })?;

        Ok(row.into_entry(id)?)
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        filter: ActivityLogFilter,
        pagination: Pagination,
    ) -> AutomaraResult<PaginatedResult<ActivityLogEntry>> {
        let tenant_id_str = tenant_id.to_string();
        let clause = Self::filter_clause(&filter);

        let count_query = format!(
            "SELECT count() AS total FROM activity_log \
             WHERE {clause} GROUP ALL"
        );
        let builder = self
            .db
            .query(&count_query)
            .bind(("tenant_id", tenant_id_str.clone()));
        let mut count_result = bind_filter(builder, &filter)
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        // Newest entries first.
        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * \
             FROM activity_log \
             WHERE {clause} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let builder = self
            .db
            .query(&page_query)
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        let mut result = bind_filter(builder, &filter)
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActivityRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
