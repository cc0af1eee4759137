//! Integration tests for the HTTP engine client against a local mock
//! server.

use automara_engine::{EngineClient, EngineError, HttpEngineClient, NewEngineWorkflow};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

fn client_for(server: &MockServer) -> HttpEngineClient {
    HttpEngineClient::new(&server.uri(), API_KEY.into()).unwrap()
}

#[tokio::test]
async fn list_tags_parses_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/tags"))
        .and(header("X-Api-Key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "tag-1", "name": "Acme Corp"},
            {"id": "tag-2", "name": "Globex"}
        ])))
        .mount(&server)
        .await;

    let tags = client_for(&server).list_tags().await.unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].id, "tag-1");
    assert_eq!(tags[0].name, "Acme Corp");
}

#[tokio::test]
async fn create_tag_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tags"))
        .and(header("X-Api-Key", API_KEY))
        .and(body_json(json!({"name": "Acme Corp"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "tag-9", "name": "Acme Corp"})),
        )
        .mount(&server)
        .await;

    let tag = client_for(&server).create_tag("Acme Corp").await.unwrap();
    assert_eq!(tag.id, "tag-9");
    assert_eq!(tag.name, "Acme Corp");
}

#[tokio::test]
async fn create_workflow_sends_full_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/workflows"))
        .and(header("X-Api-Key", API_KEY))
        .and(body_json(json!({
            "name": "Acme Corp - Welcome Flow",
            "nodes": [{"id": "start", "type": "trigger"}],
            "connections": {},
            "settings": {"timezone": "UTC"},
            "tags": ["Acme Corp"],
            "active": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "wf-100",
            "name": "Acme Corp - Welcome Flow",
            "active": false,
            "nodes": [{"id": "start", "type": "trigger"}],
            "connections": {},
            "settings": {"timezone": "UTC"},
            "tags": [{"id": "tag-1", "name": "Acme Corp"}]
        })))
        .mount(&server)
        .await;

    let created = client_for(&server)
        .create_workflow(NewEngineWorkflow {
            name: "Acme Corp - Welcome Flow".into(),
            nodes: json!([{"id": "start", "type": "trigger"}]),
            connections: json!({}),
            settings: json!({"timezone": "UTC"}),
            tags: vec!["Acme Corp".into()],
            active: false,
        })
        .await
        .unwrap();

    assert_eq!(created.id, "wf-100");
    assert!(!created.active);
    assert_eq!(created.tags.len(), 1);
}

#[tokio::test]
async fn set_workflow_active_patches_flag() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/workflows/wf-100"))
        .and(header("X-Api-Key", API_KEY))
        .and(body_json(json!({"active": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "wf-100",
            "name": "Acme Corp - Welcome Flow",
            "active": true
        })))
        .mount(&server)
        .await;

    let updated = client_for(&server)
        .set_workflow_active("wf-100", true)
        .await
        .unwrap();
    assert!(updated.active);
}

#[tokio::test]
async fn delete_workflow_accepts_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/workflows/wf-100"))
        .and(header("X-Api-Key", API_KEY))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client_for(&server).delete_workflow("wf-100").await.unwrap();
}

#[tokio::test]
async fn missing_workflow_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/wf-404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("workflow not found"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_workflow("wf-404").await.unwrap_err();
    match err {
        EngineError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "workflow not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_carries_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tags"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server).create_tag("Acme Corp").await.unwrap_err();
    assert!(matches!(err, EngineError::Api { status: 500, .. }));
    assert!(err.to_string().contains("database exploded"));
}

#[tokio::test]
async fn sparse_workflow_response_uses_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/wf-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "wf-1", "name": "Bare"})),
        )
        .mount(&server)
        .await;

    let workflow = client_for(&server).get_workflow("wf-1").await.unwrap();
    assert!(!workflow.active);
    assert!(workflow.tags.is_empty());
    assert!(workflow.nodes.is_null());
}

#[tokio::test]
async fn unreachable_engine_is_transport_error() {
    // Nothing listens on this port.
    let client = HttpEngineClient::new("http://127.0.0.1:1", API_KEY.into()).unwrap();
    let err = client.list_tags().await.unwrap_err();
    assert!(matches!(err, EngineError::Transport(_)));
}
