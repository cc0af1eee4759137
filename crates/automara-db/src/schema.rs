//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD parent_id ON TABLE tenant TYPE option<string>;
DEFINE FIELD status ON TABLE tenant TYPE string \
    ASSERT $value IN ['Active', 'Suspended', 'Archived'];
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_parent ON TABLE tenant COLUMNS parent_id;

-- =======================================================================
-- Workflows (shared templates + tenant instances)
-- =======================================================================
DEFINE TABLE workflow SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE workflow TYPE option<string>;
DEFINE FIELD name ON TABLE workflow TYPE string;
DEFINE FIELD is_template ON TABLE workflow TYPE bool DEFAULT false;
DEFINE FIELD remote_id ON TABLE workflow TYPE option<string>;
DEFINE FIELD definition ON TABLE workflow TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD template_id ON TABLE workflow TYPE option<string>;
DEFINE FIELD folder ON TABLE workflow TYPE option<string>;
DEFINE FIELD active ON TABLE workflow TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE workflow TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE workflow TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD cloned_at ON TABLE workflow TYPE option<datetime>;
DEFINE INDEX idx_workflow_tenant_name ON TABLE workflow \
    COLUMNS tenant_id, name UNIQUE;
DEFINE INDEX idx_workflow_tenant ON TABLE workflow COLUMNS tenant_id;

-- =======================================================================
-- Activity Log (tenant scope, append-only)
-- =======================================================================
DEFINE TABLE activity_log SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD tenant_id ON TABLE activity_log TYPE string;
DEFINE FIELD workflow_id ON TABLE activity_log TYPE string;
DEFINE FIELD actor_id ON TABLE activity_log TYPE string;
DEFINE FIELD action ON TABLE activity_log TYPE string \
    ASSERT $value IN ['Activated', 'Deactivated', 'Deleted'];
DEFINE FIELD detail ON TABLE activity_log TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE activity_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_activity_tenant_time ON TABLE activity_log \
    COLUMNS tenant_id, created_at;
DEFINE INDEX idx_activity_tenant_workflow ON TABLE activity_log \
    COLUMNS tenant_id, workflow_id;

-- =======================================================================
-- Credentials (tenant scope, vault envelopes)
-- =======================================================================
DEFINE TABLE credential SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE credential TYPE string;
DEFINE FIELD service ON TABLE credential TYPE string;
DEFINE FIELD encrypted_value ON TABLE credential TYPE string;
DEFINE FIELD created_at ON TABLE credential TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE credential TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credential_tenant_service ON TABLE credential \
    COLUMNS tenant_id, service UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
