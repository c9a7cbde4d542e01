//! HTTP API tests driving the router in-process

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use kindred_server::{create_router, ServerConfig};
use kindred_storage::MemoryStorage;
use serde_json::{json, Value};
use tower::ServiceExt; // For oneshot

// ============================================================================
// Helper Functions
// ============================================================================

fn test_app() -> Router {
    let config = ServerConfig::default().with_passcode_cost(4);
    create_router(Arc::new(MemoryStorage::new()), &config)
}

async fn send(app: &Router, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };

    (status, value)
}

async fn create_tree(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/trees",
        Some(json!({"name": "Okafor", "passcode": "blue-heron"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn add_member(app: &Router, tree: i64, name: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/trees/{}/members", tree),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_i64().unwrap()
}

async fn relate(app: &Router, tree: i64, p1: i64, p2: i64, kind: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/trees/{}/relationships", tree),
        Some(json!({"person1_id": p1, "person2_id": p2, "relationship_type": kind})),
    )
    .await
}

// ============================================================================
// Health and trees
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["server"], "kindred");
}

#[tokio::test]
async fn test_create_tree() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/trees",
        Some(json!({"name": "Okafor", "passcode": "blue-heron"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Okafor");
    assert_eq!(body["message"], "Family tree created successfully");
    assert!(body["id"].is_i64());
}

#[tokio::test]
async fn test_create_tree_requires_name_and_passcode() {
    let app = test_app();

    for payload in [
        json!({"name": "Okafor"}),
        json!({"passcode": "secret"}),
        json!({"name": "", "passcode": "secret"}),
    ] {
        let (status, body) = send(&app, "POST", "/api/trees", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name and passcode are required");
    }
}

#[tokio::test]
async fn test_verify_passcode() {
    let app = test_app();
    let tree = create_tree(&app).await;
    let uri = format!("/api/trees/{}/verify", tree);

    let (status, body) = send(&app, "POST", &uri, Some(json!({"passcode": "blue-heron"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["tree"]["id"], tree);
    assert_eq!(body["tree"]["name"], "Okafor");

    let (status, body) = send(&app, "POST", &uri, Some(json!({"passcode": "red-heron"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid passcode");

    let (status, body) = send(&app, "POST", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passcode is required");

    let (status, body) = send(
        &app,
        "POST",
        "/api/trees/999/verify",
        Some(json!({"passcode": "blue-heron"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Family tree not found");
}

// ============================================================================
// Members
// ============================================================================

#[tokio::test]
async fn test_member_lifecycle() {
    let app = test_app();
    let tree = create_tree(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/trees/{}/members", tree),
        Some(json!({"name": "Ada", "gender": "female", "birth_date": "1901-02-03", "notes": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member added successfully");
    let ada = body["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/trees/{}/members", tree), None).await;
    assert_eq!(status, StatusCode::OK);
    let members = body.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["name"], "Ada");
    assert_eq!(members[0]["birth_date"], "1901-02-03");
    assert!(members[0]["notes"].is_null());

    let member_uri = format!("/api/trees/{}/members/{}", tree, ada);
    let (status, body) = send(&app, "PUT", &member_uri, Some(json!({"name": "Ada Okafor"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member updated successfully");

    let (_, body) = send(&app, "GET", &format!("/api/trees/{}/members", tree), None).await;
    assert_eq!(body[0]["name"], "Ada Okafor");
    assert!(body[0]["gender"].is_null());

    let (status, body) = send(&app, "DELETE", &member_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Member deleted successfully");

    let (status, body) = send(&app, "DELETE", &member_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Member not found");
}

#[tokio::test]
async fn test_member_requires_name() {
    let app = test_app();
    let tree = create_tree(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/trees/{}/members", tree),
        Some(json!({"gender": "male"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");
}

#[tokio::test]
async fn test_update_unknown_member() {
    let app = test_app();
    let tree = create_tree(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/trees/{}/members/999", tree),
        Some(json!({"name": "Ghost"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Member not found");
}

#[tokio::test]
async fn test_unknown_tree_members() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/trees/999/members", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Family tree not found");

    let (status, _) = send(
        &app,
        "POST",
        "/api/trees/999/members",
        Some(json!({"name": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_are_bad_requests() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/api/trees/abc/members", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Relationships
// ============================================================================

#[tokio::test]
async fn test_relationship_lifecycle() {
    let app = test_app();
    let tree = create_tree(&app).await;
    let ada = add_member(&app, tree, "Ada").await;
    let ben = add_member(&app, tree, "Ben").await;

    let (status, body) = relate(&app, tree, ada, ben, "parent").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Relationship added successfully");
    let rel = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/trees/{}/relationships", tree),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["person1_id"], ada);
    assert_eq!(body[0]["person2_id"], ben);
    assert_eq!(body[0]["relationship_type"], "parent");

    let rel_uri = format!("/api/trees/{}/relationships/{}", tree, rel);
    let (status, body) = send(&app, "DELETE", &rel_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Relationship deleted successfully");

    let (status, body) = send(&app, "DELETE", &rel_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Relationship not found");
}

#[tokio::test]
async fn test_relationship_validation() {
    let app = test_app();
    let tree = create_tree(&app).await;
    let ada = add_member(&app, tree, "Ada").await;
    let ben = add_member(&app, tree, "Ben").await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/trees/{}/relationships", tree),
        Some(json!({"person1_id": ada, "relationship_type": "parent"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let (status, body) = relate(&app, tree, ada, ada, "parent").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "A person cannot have a relationship with themselves"
    );

    let (status, _) = relate(&app, tree, ada, ben, "spouse").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = relate(&app, tree, ada, ben, "spouse").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Relationship already exists");

    let (status, body) = relate(&app, tree, ada, 999, "parent").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Member not found");
}

// ============================================================================
// Relationship paths
// ============================================================================

#[tokio::test]
async fn test_relationship_path() {
    let app = test_app();
    let tree = create_tree(&app).await;
    let ada = add_member(&app, tree, "Ada").await;
    let ben = add_member(&app, tree, "Ben").await;
    let cal = add_member(&app, tree, "Cal").await;
    relate(&app, tree, ada, ben, "parent").await;
    relate(&app, tree, ben, cal, "parent").await;

    let uri = format!(
        "/api/trees/{}/relationship-path?person1_id={}&person2_id={}",
        tree, cal, ada
    );
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let steps = body["path"].as_array().unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["from"]["name"], "Cal");
    assert_eq!(steps[0]["to"]["name"], "Ben");
    assert_eq!(steps[0]["relationship"], "child");
    assert_eq!(steps[1]["from"]["name"], "Ben");
    assert_eq!(steps[1]["to"]["name"], "Ada");
    assert_eq!(steps[1]["relationship"], "child");
}

#[tokio::test]
async fn test_relationship_path_not_connected() {
    let app = test_app();
    let tree = create_tree(&app).await;
    let ada = add_member(&app, tree, "Ada").await;
    let ben = add_member(&app, tree, "Ben").await;

    let uri = format!(
        "/api/trees/{}/relationship-path?person1_id={}&person2_id={}",
        tree, ada, ben
    );
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["path"].is_null());
}

#[tokio::test]
async fn test_relationship_path_bad_queries() {
    let app = test_app();
    let tree = create_tree(&app).await;
    let ada = add_member(&app, tree, "Ada").await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/trees/{}/relationship-path?person1_id={}", tree, ada),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Both person IDs are required");

    let (status, _) = send(
        &app,
        "GET",
        &format!(
            "/api/trees/{}/relationship-path?person1_id={}&person2_id=abc",
            tree, ada
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "GET",
        &format!(
            "/api/trees/{}/relationship-path?person1_id={}&person2_id={}",
            tree, ada, ada
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select two different people");
}
