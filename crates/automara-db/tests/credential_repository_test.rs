//! Integration tests for the Credential repository implementation
//! using in-memory SurrealDB.

use automara_core::error::AutomaraError;
use automara_core::models::credential::StoreCredential;
use automara_core::repository::{CredentialRepository, Pagination};
use automara_db::repository::SurrealCredentialRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> SurrealCredentialRepository<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    automara_db::run_migrations(&db).await.unwrap();
    SurrealCredentialRepository::new(db)
}

fn envelope(tenant_id: Uuid, service: &str, value: &str) -> StoreCredential {
    StoreCredential {
        tenant_id,
        service: service.into(),
        encrypted_value: value.into(),
    }
}

#[tokio::test]
async fn upsert_and_get_credential() {
    let repo = setup().await;
    let tenant_id = Uuid::new_v4();

    let stored = repo
        .upsert(envelope(tenant_id, "smtp", "AQsalt...envelope-1"))
        .await
        .unwrap();

    assert_eq!(stored.tenant_id, tenant_id);
    assert_eq!(stored.service, "smtp");
    assert_eq!(stored.encrypted_value, "AQsalt...envelope-1");

    let fetched = repo.get(tenant_id, "smtp").await.unwrap();
    assert_eq!(fetched.id, stored.id);
    assert_eq!(fetched.encrypted_value, "AQsalt...envelope-1");
}

#[tokio::test]
async fn upsert_replaces_existing_envelope() {
    let repo = setup().await;
    let tenant_id = Uuid::new_v4();

    let first = repo
        .upsert(envelope(tenant_id, "smtp", "envelope-1"))
        .await
        .unwrap();
    let second = repo
        .upsert(envelope(tenant_id, "smtp", "envelope-2"))
        .await
        .unwrap();

    // Same row, new envelope.
    assert_eq!(second.id, first.id);
    assert_eq!(second.encrypted_value, "envelope-2");
    assert!(second.updated_at >= first.updated_at);

    let page = repo.list(tenant_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn get_missing_credential_is_not_found() {
    let repo = setup().await;

    let result = repo.get(Uuid::new_v4(), "smtp").await;
    assert!(matches!(
        result.unwrap_err(),
        AutomaraError::NotFound { .. }
    ));
}

#[tokio::test]
async fn credentials_are_isolated_per_tenant() {
    let repo = setup().await;
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();

    repo.upsert(envelope(tenant_a, "smtp", "envelope-a"))
        .await
        .unwrap();
    repo.upsert(envelope(tenant_b, "smtp", "envelope-b"))
        .await
        .unwrap();

    let a = repo.get(tenant_a, "smtp").await.unwrap();
    let b = repo.get(tenant_b, "smtp").await.unwrap();
    assert_eq!(a.encrypted_value, "envelope-a");
    assert_eq!(b.encrypted_value, "envelope-b");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let repo = setup().await;
    let tenant_id = Uuid::new_v4();

    repo.upsert(envelope(tenant_id, "smtp", "envelope-1"))
        .await
        .unwrap();
    repo.delete(tenant_id, "smtp").await.unwrap();

    let result = repo.get(tenant_id, "smtp").await;
    assert!(matches!(
        result.unwrap_err(),
        AutomaraError::NotFound { .. }
    ));
}

#[tokio::test]
async fn list_credentials_sorted_by_service() {
    let repo = setup().await;
    let tenant_id = Uuid::new_v4();

    repo.upsert(envelope(tenant_id, "smtp", "envelope-1"))
        .await
        .unwrap();
    repo.upsert(envelope(tenant_id, "crm", "envelope-2"))
        .await
        .unwrap();
    repo.upsert(envelope(tenant_id, "storage", "envelope-3"))
        .await
        .unwrap();

    let page = repo.list(tenant_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 3);
    let services: Vec<&str> = page.items.iter().map(|c| c.service.as_str()).collect();
    assert_eq!(services, vec!["crm", "smtp", "storage"]);
}
