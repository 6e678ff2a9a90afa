use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use inventory::config::InventoryConfig;
use inventory::domain::store::DocumentStore;
use inventory::infra::storage::{InMemoryStore, JsonFileStore};
use inventory::model::Document;
use inventory::Inventory;

/// Create a test HTTP router over an empty in-memory document
fn test_app() -> Router {
    app_with_store(Arc::new(InMemoryStore::with_document(Document::default())))
}

fn app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    Inventory::init(store, &InventoryConfig::default()).register_rest(Router::new())
}

fn ada() -> Value {
    json!({ "name": "Ada", "email": "a@x.com" })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn item_lifecycle() {
    let app = test_app();

    let (status, created) = send(
        &app,
        "POST",
        "/inventory",
        Some(json!({ "id": "sofa-1", "name": "Sofa", "sellPrice": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "sofa-1");
    assert_eq!(created["sellPrice"], 100.0);
    assert!(created["category"].is_null());
    assert_eq!(created["interestedBuyers"], json!([]));
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, fetched) = send(&app, "GET", "/inventory/sofa-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, patched) = send(
        &app,
        "PATCH",
        "/inventory/sofa-1",
        Some(json!({ "id": "hijack", "sellPrice": 200 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["id"], "sofa-1");
    assert_eq!(patched["name"], "Sofa");
    assert_eq!(patched["sellPrice"], 200.0);
    assert_eq!(patched["createdAt"], created["createdAt"]);
    assert_ne!(patched["updatedAt"], created["updatedAt"]);

    let (status, body) = send(&app, "DELETE", "/inventory/sofa-1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", "/inventory/sofa-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null, "error responses have no body");
}

#[tokio::test]
async fn item_create_validation() {
    let app = test_app();

    let (status, _) = send(&app, "POST", "/inventory", Some(json!({ "name": "No id" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let blank = json!({ "id": "x", "name": "" });
    let (status, _) = send(&app, "POST", "/inventory", Some(blank)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let item = json!({ "id": "lamp-1", "name": "Lamp" });
    let (status, _) = send(&app, "POST", "/inventory", Some(item.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/inventory", Some(item)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, list) = send(&app, "GET", "/inventory", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn patch_can_clear_nullable_fields() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/inventory",
        Some(json!({ "id": "rug-1", "name": "Rug", "color": "red" })),
    )
    .await;

    let clear = json!({ "color": null });
    let (status, patched) = send(&app, "PATCH", "/inventory/rug-1", Some(clear)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(patched["color"].is_null());

    let (status, _) = send(&app, "PATCH", "/inventory/ghost", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn buyer_double_create_conflicts() {
    let app = test_app();
    let ada = json!({ "name": "Ada", "email": "ada@example.com" });

    let (status, created) = send(&app, "POST", "/buyers", Some(ada.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(created["wishlist"], json!([]));

    let (status, _) = send(&app, "POST", "/buyers", Some(ada)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "POST", "/buyers", Some(json!({ "name": "No email" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn buyer_update_and_delete() {
    let app = test_app();
    let (_, a) = send(&app, "POST", "/buyers", Some(ada())).await;
    send(&app, "POST", "/buyers", Some(json!({ "name": "Bo", "email": "b@x.com" }))).await;
    let uri = format!("/buyers/{}", a["id"].as_str().unwrap());

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "email": "b@x.com" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(&app, "PATCH", &uri, Some(json!({ "name": "Ada L." }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Ada L.");
    assert_eq!(updated["email"], "a@x.com");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, "GET", "/buyers", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn interested_buyer_relation() {
    let app = test_app();
    send(&app, "POST", "/inventory", Some(json!({ "id": "sofa-1", "name": "Sofa" }))).await;
    let (_, buyer) = send(&app, "POST", "/buyers", Some(ada())).await;
    let buyer_id = buyer["id"].clone();

    let (status, _) = send(
        &app,
        "POST",
        "/inventory/sofa-1/buyers",
        Some(json!({ "buyerId": "does-not-exist" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/inventory/sofa-1/buyers", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, item) = send(
        &app,
        "POST",
        "/inventory/sofa-1/buyers",
        Some(json!({ "buyerId": buyer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(item["interestedBuyers"], json!([buyer_id]));

    let (status, _) = send(
        &app,
        "POST",
        "/inventory/sofa-1/buyers",
        Some(json!({ "buyerId": buyer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, buyers) = send(&app, "GET", "/inventory/sofa-1/buyers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(buyers[0]["email"], "a@x.com");

    let (status, _) = send(
        &app,
        "DELETE",
        "/inventory/sofa-1/buyers",
        Some(json!({ "buyerId": buyer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        "/inventory/sofa-1/buyers",
        Some(json!({ "buyerId": buyer_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_MODIFIED);

    let (status, _) = send(&app, "GET", "/inventory/ghost/buyers", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_relation_body_is_bad_request() {
    let app = test_app();
    send(&app, "POST", "/inventory", Some(json!({ "id": "sofa-1", "name": "Sofa" }))).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/inventory/sofa-1/buyers")
                .header("content-type", "application/json")
                .body(Body::from("{ nope"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Send `body` verbatim, with an optional content type, and return the raw reply.
async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &'static str,
) -> (StatusCode, axum::body::Bytes) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        req = req.header("content-type", ct);
    }
    let response = app
        .clone()
        .oneshot(req.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes)
}

#[tokio::test]
async fn empty_create_body_is_missing_fields() {
    let app = test_app();

    for uri in ["/inventory", "/buyers"] {
        for content_type in [None, Some("application/json"), Some("text/plain")] {
            let (status, body) = send_raw(&app, "POST", uri, content_type, "").await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri} {content_type:?}");
            assert!(body.is_empty(), "error responses have no body");
        }
    }

    // a JSON body without a content type is still read
    let (status, _) = send_raw(
        &app,
        "POST",
        "/inventory",
        None,
        r#"{ "id": "mat-1", "name": "Mat" }"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn empty_patch_body_touches_only_updated_at() {
    let app = test_app();
    let (_, item) = send(
        &app,
        "POST",
        "/inventory",
        Some(json!({ "id": "sofa-1", "name": "Sofa" })),
    )
    .await;
    let (_, buyer) = send(&app, "POST", "/buyers", Some(ada())).await;

    let (status, bytes) = send_raw(&app, "PATCH", "/inventory/sofa-1", None, "").await;
    assert_eq!(status, StatusCode::OK);
    let patched: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(patched["name"], item["name"]);
    assert_ne!(patched["updatedAt"], item["updatedAt"]);

    let uri = format!("/buyers/{}", buyer["id"].as_str().unwrap());
    let (status, bytes) = send_raw(&app, "PATCH", &uri, None, "").await;
    assert_eq!(status, StatusCode::OK);
    let patched: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(patched["email"], buyer["email"]);
}

#[tokio::test]
async fn malformed_record_body_is_bare_bad_request() {
    let app = test_app();

    let (status, body) = send_raw(&app, "POST", "/buyers", None, "{ nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());

    let (status, body) = send_raw(
        &app,
        "PATCH",
        "/inventory/anything",
        Some("application/json"),
        "[1, 2",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.is_empty());
}

#[tokio::test]
async fn patch_cannot_blank_required_fields() {
    let app = test_app();
    send(
        &app,
        "POST",
        "/inventory",
        Some(json!({ "id": "sofa-1", "name": "Sofa" })),
    )
    .await;
    let (_, a) = send(&app, "POST", "/buyers", Some(ada())).await;
    let bo = json!({ "name": "Bo", "email": "b@x.com" });
    let (_, b) = send(&app, "POST", "/buyers", Some(bo)).await;

    let (status, _) = send(&app, "PATCH", "/inventory/sofa-1", Some(json!({ "name": "" }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, item) = send(&app, "GET", "/inventory/sofa-1", None).await;
    assert_eq!(item["name"], "Sofa");

    // neither buyer may take the empty string as an email
    for buyer in [&a, &b] {
        let uri = format!("/buyers/{}", buyer["id"].as_str().unwrap());
        let (status, _) = send(&app, "PATCH", &uri, Some(json!({ "email": "" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (_, stored) = send(&app, "GET", &uri, None).await;
        assert_eq!(stored["email"], buyer["email"]);
    }
}

#[tokio::test]
async fn file_store_persists_between_routers() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("db.json");

    let app = app_with_store(Arc::new(JsonFileStore::new(&path, 3)));
    let (status, seeded) = send(&app, "GET", "/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
    let seeded = seeded.as_array().unwrap().clone();
    assert!(!seeded.is_empty());
    assert!(seeded
        .iter()
        .all(|i| i["id"].as_str().is_some_and(|id| id == id.to_lowercase())));

    let new_item = json!({ "id": "new-1", "name": "New" });
    let (status, _) = send(&app, "POST", "/inventory", Some(new_item)).await;
    assert_eq!(status, StatusCode::CREATED);

    // a fresh store over the same file sees the write
    let again = app_with_store(Arc::new(JsonFileStore::new(&path, 3)));
    let (_, list) = send(&again, "GET", "/inventory", None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), seeded.len() + 1);
    assert_eq!(list.last().unwrap()["id"], "new-1");

    let (_, buyers) = send(&again, "GET", "/buyers", None).await;
    assert_eq!(buyers.as_array().map(Vec::len), Some(3));
}

struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn load(&self) -> anyhow::Result<Document> {
        anyhow::bail!("permission denied")
    }

    async fn save(&self, _doc: &Document) -> anyhow::Result<()> {
        anyhow::bail!("permission denied")
    }
}

#[tokio::test]
async fn storage_failures_are_internal_errors() {
    let app = app_with_store(Arc::new(FailingStore));

    let (status, body) = send(&app, "GET", "/inventory", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, "POST", "/buyers", Some(ada())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
