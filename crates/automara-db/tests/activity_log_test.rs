//! Integration tests for the ActivityLog repository implementation
//! using in-memory SurrealDB.

use automara_core::models::activity::{ActivityAction, CreateActivityLogEntry};
use automara_core::repository::{ActivityLogFilter, ActivityLogRepository, Pagination};
use automara_db::repository::SurrealActivityLogRepository;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> (SurrealActivityLogRepository<Db>, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    automara_db::run_migrations(&db).await.unwrap();
    (SurrealActivityLogRepository::new(db.clone()), db)
}

fn entry(
    tenant_id: Uuid,
    workflow_id: Uuid,
    actor_id: Uuid,
    action: ActivityAction,
) -> CreateActivityLogEntry {
    CreateActivityLogEntry {
        tenant_id,
        workflow_id,
        actor_id,
        action,
        detail: Some(json!({"name": "ACME Corp - Welcome Flow"})),
    }
}

#[tokio::test]
async fn append_and_list_entries() {
    let (repo, _db) = setup().await;
    let tenant_id = Uuid::new_v4();
    let workflow_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    let appended = repo
        .append(entry(
            tenant_id,
            workflow_id,
            actor_id,
            ActivityAction::Activated,
        ))
        .await
        .unwrap();

    assert_eq!(appended.tenant_id, tenant_id);
    assert_eq!(appended.workflow_id, workflow_id);
    assert_eq!(appended.actor_id, actor_id);
    assert_eq!(appended.action, ActivityAction::Activated);
    assert_eq!(appended.detail["name"], "ACME Corp - Welcome Flow");

    let page = repo
        .list(tenant_id, ActivityLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, appended.id);
}

#[tokio::test]
async fn list_is_scoped_to_tenant() {
    let (repo, _db) = setup().await;
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let workflow_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    repo.append(entry(
        tenant_a,
        workflow_id,
        actor_id,
        ActivityAction::Activated,
    ))
    .await
    .unwrap();
    repo.append(entry(
        tenant_b,
        workflow_id,
        actor_id,
        ActivityAction::Deleted,
    ))
    .await
    .unwrap();

    let page = repo
        .list(tenant_a, ActivityLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].tenant_id, tenant_a);
}

#[tokio::test]
async fn filter_by_workflow_and_action() {
    let (repo, _db) = setup().await;
    let tenant_id = Uuid::new_v4();
    let workflow_a = Uuid::new_v4();
    let workflow_b = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    repo.append(entry(
        tenant_id,
        workflow_a,
        actor_id,
        ActivityAction::Activated,
    ))
    .await
    .unwrap();
    repo.append(entry(
        tenant_id,
        workflow_a,
        actor_id,
        ActivityAction::Deactivated,
    ))
    .await
    .unwrap();
    repo.append(entry(
        tenant_id,
        workflow_b,
        actor_id,
        ActivityAction::Activated,
    ))
    .await
    .unwrap();

    let by_workflow = repo
        .list(
            tenant_id,
            ActivityLogFilter {
                workflow_id: Some(workflow_a),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_workflow.total, 2);
    assert!(by_workflow.items.iter().all(|e| e.workflow_id == workflow_a));

    let by_action = repo
        .list(
            tenant_id,
            ActivityLogFilter {
                action: Some(ActivityAction::Activated),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_action.total, 2);
    assert!(
        by_action
            .items
            .iter()
            .all(|e| e.action == ActivityAction::Activated)
    );

    let combined = repo
        .list(
            tenant_id,
            ActivityLogFilter {
                workflow_id: Some(workflow_a),
                action: Some(ActivityAction::Activated),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(combined.total, 1);
}

#[tokio::test]
async fn list_returns_newest_first() {
    let (repo, _db) = setup().await;
    let tenant_id = Uuid::new_v4();
    let workflow_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    repo.append(entry(
        tenant_id,
        workflow_id,
        actor_id,
        ActivityAction::Activated,
    ))
    .await
    .unwrap();
    repo.append(entry(
        tenant_id,
        workflow_id,
        actor_id,
        ActivityAction::Deactivated,
    ))
    .await
    .unwrap();
    let last = repo
        .append(entry(
            tenant_id,
            workflow_id,
            actor_id,
            ActivityAction::Deleted,
        ))
        .await
        .unwrap();

    let page = repo
        .list(tenant_id, ActivityLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items[0].id, last.id);
}

#[tokio::test]
async fn pagination_limits_entries() {
    let (repo, _db) = setup().await;
    let tenant_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    for _ in 0..5 {
        repo.append(entry(
            tenant_id,
            Uuid::new_v4(),
            actor_id,
            ActivityAction::Activated,
        ))
        .await
        .unwrap();
    }

    let page = repo
        .list(
            tenant_id,
            ActivityLogFilter::default(),
            Pagination {
                offset: 0,
                limit: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn actions_are_stored_as_variant_names() {
    let (repo, db) = setup().await;

    repo.append(entry(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        ActivityAction::Deactivated,
    ))
    .await
    .unwrap();

    // The stored string is the enum variant name, matching the schema
    // ASSERT list.
    let mut result = db.query("SELECT action FROM activity_log").await.unwrap();
    let rows: surrealdb::Value = result.take(0).unwrap();
    assert!(format!("{:?}", rows).contains("Deactivated"));
}
