use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use naukrimili::config::Config;
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.provider.enabled = false;

    let state = naukrimili::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    naukrimili::api::router(state).await
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/system/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["database_ok"], true);
    assert_eq!(json["data"]["provider_enabled"], false);
    assert_eq!(json["data"]["active_jobs"], 0);
    assert!(json["data"]["version"].is_string());
}

#[tokio::test]
async fn test_system_config_masks_credentials() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/system/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["data"]["general"]["database_path"].is_string());
    // Empty credentials stay empty rather than being replaced by a mask.
    assert_eq!(json["data"]["provider"]["app_key"], "");
}

#[tokio::test]
async fn test_job_crud_roundtrip() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/jobs",
            serde_json::json!({
                "title": "Platform Engineer",
                "company": "Acme",
                "location": "Bengaluru",
                "skills": ["Rust", "SQL"],
                "is_featured": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["title"], "Platform Engineer");
    assert_eq!(created["data"]["source"], "database");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!("/api/jobs/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["company"], "Acme");
    assert_eq!(fetched["data"]["is_featured"], true);

    let response = app.clone().oneshot(get("/api/jobs/999999")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.oneshot(get("/api/jobs?page=1&limit=10")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["data"]["jobs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_job_validation() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/api/jobs",
            serde_json::json!({ "title": "  ", "company": "Acme" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_search_endpoint_envelope() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/jobs",
            serde_json::json!({
                "title": "Remote Rust Developer",
                "company": "Acme",
                "location": "Bengaluru",
                "is_remote": true
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/jobs/search?query=rust&remote_only=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(json["jobs"][0]["title"], "Remote Rust Developer");
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["filters"]["query"], "rust");
    assert_eq!(json["metrics"]["cache_hit"], false);
    assert_eq!(json["metrics"]["sources"][0], "database");

    // The same request again is answered from the cache.
    let response = app
        .oneshot(get("/api/jobs/search?query=rust&remote_only=true"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["metrics"]["cache_hit"], true);
    assert_eq!(json["metrics"]["sources"][0], "cache");
}

#[tokio::test]
async fn test_cache_endpoints() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/search/cache/stats"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["size"], 0);

    let response = app
        .clone()
        .oneshot(get("/api/jobs/search?query=anything"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/search/cache/stats"))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["size"], 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/search/cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["size"], 0);
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
