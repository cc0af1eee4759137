//! Integration tests for schema initialization using in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[derive(Debug, serde::Deserialize)]
struct MigrationRow {
    #[allow(dead_code)]
    version: u32,
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    automara_db::run_migrations(&db).await.unwrap();

    // Verify that key tables exist by querying INFO FOR DB.
    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: surrealdb::Value = result.take(0).unwrap();
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("tenant"), "missing tenant table");
    assert!(info_str.contains("workflow"), "missing workflow table");
    assert!(
        info_str.contains("activity_log"),
        "missing activity_log table"
    );
    assert!(info_str.contains("credential"), "missing credential table");

    // Verify migration was recorded.
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    // Run twice — should not fail.
    automara_db::run_migrations(&db).await.unwrap();
    automara_db::run_migrations(&db).await.unwrap();

    // Verify only one migration record exists.
    let mut result = db.query("SELECT version FROM _migration").await.unwrap();
    let records: Vec<MigrationRow> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn can_create_record_after_migration() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    automara_db::run_migrations(&db).await.unwrap();

    // Create a tenant record to verify the schema works.
    db.query(
        "CREATE tenant SET \
         name = 'ACME Corp', \
         parent_id = NONE, \
         status = 'Active'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    let mut result = db
        .query("SELECT name FROM tenant WHERE name = 'ACME Corp'")
        .await
        .unwrap();

    #[derive(Debug, serde::Deserialize)]
    struct NameRow {
        #[allow(dead_code)]
        name: String,
    }
    let records: Vec<NameRow> = result.take(0).unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn status_assert_rejects_unknown_values() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    automara_db::run_migrations(&db).await.unwrap();

    let result = db
        .query(
            "CREATE tenant SET \
             name = 'Bad Corp', \
             parent_id = NONE, \
             status = 'Dormant'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown status should be rejected");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_instance_names() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    automara_db::run_migrations(&db).await.unwrap();

    // Create first instance.
    db.query(
        "CREATE workflow SET \
         tenant_id = 't-1', \
         name = 'ACME Corp - Welcome', \
         is_template = false, \
         remote_id = 'wf-1', \
         definition = {}, \
         template_id = NONE, \
         folder = NONE, \
         active = false, \
         cloned_at = NONE",
    )
    .await
    .unwrap()
    .check()
    .unwrap();

    // Same (tenant_id, name) pair — should fail.
    let result = db
        .query(
            "CREATE workflow SET \
             tenant_id = 't-1', \
             name = 'ACME Corp - Welcome', \
             is_template = false, \
             remote_id = 'wf-2', \
             definition = {}, \
             template_id = NONE, \
             folder = NONE, \
             active = false, \
             cloned_at = NONE",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate instance name should be rejected");
}
