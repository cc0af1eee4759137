//! SurrealDB implementation of [`CredentialRepository`].

use automara_core::error::AutomaraResult;
use automara_core::models::credential::{StoreCredential, TenantCredential};
use automara_core::repository::{CredentialRepository, PaginatedResult, Pagination};
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;

use crate::error::{DbError, is_unique_violation};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct CredentialRow {
    tenant_id: String,
    service: String,
    encrypted_value: String,
    created_at: Datetime,
    updated_at: Datetime,
}

impl CredentialRow {
    fn into_credential(self, id: Uuid) -> Result<TenantCredential, DbError> {
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::InvalidRow(format!("invalid tenant UUID: {e}")))?;
        Ok(TenantCredential {
            id,
            tenant_id,
            service: self.service,
            encrypted_value: self.encrypted_value,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct CredentialRowWithId {
    record_id: String,
    tenant_id: String,
    service: String,
    encrypted_value: String,
    created_at: Datetime,
    updated_at: Datetime,
}

impl CredentialRowWithId {
    fn try_into_credential(self) -> Result<TenantCredential, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::InvalidRow(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::InvalidRow(format!("invalid tenant UUID: {e}")))?;
        Ok(TenantCredential {
            id,
            tenant_id,
            service: self.service,
            encrypted_value: self.encrypted_value,
            created_at: self.created_at.0,
            updated_at: self.updated_at.0,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Credential repository.
#[derive(Clone)]
pub struct SurrealCredentialRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCredentialRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn find(
        &self,
        tenant_id: Uuid,
        service: &str,
    ) -> Result<Option<CredentialRowWithId>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM credential \
                 WHERE tenant_id = $tenant_id AND service = $service",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("service", service.to_string()))
            .await?;

        let rows: Vec<CredentialRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> CredentialRepository for SurrealCredentialRepository<C> {
    async fn upsert(&self, input: StoreCredential) -> AutomaraResult<TenantCredential> {
        // The (tenant_id, service) pair is the natural key: replace the
        // envelope in place when a row exists, otherwise create one.
        if let Some(existing) = self.find(input.tenant_id, &input.service).await? {
            let id = Uuid::parse_str(&existing.record_id)
                .map_err(|e| DbError::InvalidRow(format!("invalid UUID: {e}")))?;
            let id_str = existing.record_id;

            let result = self
                .db
                .query(
                    "UPDATE type::thing('credential', $id) SET \
                     encrypted_value = $encrypted_value, \
                     updated_at = time::now()",
                )
                .bind(("id", id_str.clone()))
                .bind(("encrypted_value", input.encrypted_value))
                .await
                .map_err(DbError::from)?;

            let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

            let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
            let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: "credential".into(),
                id: id_str,
            })?;

            return Ok(row.into_credential(id)?);
        }

        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('credential', $id) SET \
                 tenant_id = $tenant_id, \
                 service = $service, \
                 encrypted_value = $encrypted_value",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("service", input.service))
            .bind(("encrypted_value", input.encrypted_value))
            .await
            .map_err(DbError::from)?;

        // A concurrent writer can land between find and create; the
        // unique index turns that into a Duplicate for the caller.
        let mut result = match result.check() {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => {
                return Err(DbError::Duplicate {
                    entity: "credential".into(),
                }
                .into());
            }
            Err(e) => return Err(DbError::Query(e.to_string()).into()),
        };

        let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "credential".into(),
            id: id_str,
        })?;

        Ok(row.into_credential(id)?)
    }

    async fn get(&self, tenant_id: Uuid, service: &str) -> AutomaraResult<TenantCredential> {
        let row = self
            .find(tenant_id, service)
            .await?
            .ok_or_else(|| DbError::NotFound {
                entity: "credential".into(),
                id: format!("tenant={tenant_id},service={service}"),
            })?;

        Ok(row.try_into_credential()?)
    }

    async fn delete(&self, tenant_id: Uuid, service: &str) -> AutomaraResult<()> {
        self.db
            .query(
                "DELETE FROM credential \
                 WHERE tenant_id = $tenant_id AND service = $service",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("service", service.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(
        &self,
        tenant_id: Uuid,
        pagination: Pagination,
    ) -> AutomaraResult<PaginatedResult<TenantCredential>> {
        let tenant_id_str = tenant_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM credential \
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
                 FROM credential \
                 WHERE tenant_id = $tenant_id \
                 ORDER BY service ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("tenant_id", tenant_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CredentialRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_credential())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
