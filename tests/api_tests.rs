//! Request-level tests against the assembled router: bearer authentication,
//! status codes for the error taxonomy, and the error body shape.

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use rbac::seeds;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

#[path = "common/mod.rs"]
mod common;
use common::{TEST_TOKEN, setup_test_app};

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", TEST_TOKEN))
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn create_role(app: &Router, name: &str) -> Result<Value> {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/roles",
            Some(json!({"name": name})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await
}

#[tokio::test]
async fn root_and_health_are_public() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert_eq!(body["service"], "rbac");

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn api_routes_require_a_bearer_token() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/roles").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/roles")
                .header(header::AUTHORIZATION, "Bearer wrong-token")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn every_response_carries_a_trace_id_header() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert!(response.headers().contains_key("x-trace-id"));
    Ok(())
}

#[tokio::test]
async fn role_lifecycle_over_http() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let created = create_role(&app, "editor").await?;
    let role_id = created["id"].as_str().expect("role id").to_string();
    assert_eq!(created["name"], "editor");
    assert_eq!(created["permissions"], json!([]));

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/api/v1/roles/{}", role_id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/v1/roles/{}", role_id),
            Some(json!({"description": "Can edit articles"})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await?;
    assert_eq!(updated["description"], "Can edit articles");

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/v1/roles/{}", role_id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("GET", &format!("/api/v1/roles/{}", role_id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn invalid_role_payload_yields_400_with_error_shape() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .oneshot(request("POST", "/api/v1/roles", Some(json!({"name": "  "}))))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await?;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["message"].is_string());
    assert!(body["trace_id"].is_string());
    Ok(())
}

#[tokio::test]
async fn duplicate_role_name_yields_409() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    create_role(&app, "editor").await?;
    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/roles",
            Some(json!({"name": "editor"})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await?;
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn role_with_unknown_permission_yields_400() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/roles",
            Some(json!({"name": "editor", "permission_ids": [Uuid::new_v4()]})),
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn user_lifecycle_over_http() -> Result<()> {
    let (app, db) = setup_test_app().await?;
    seeds::run(&db).await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/users",
            Some(json!({
                "email": "ada@example.com",
                "password": "correct horse battery",
                "first_name": "Ada",
                "last_name": "Lovelace"
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = json_body(response).await?;
    let user_id = created["id"].as_str().expect("user id").to_string();
    assert_eq!(created["roles"][0]["name"], "user");
    // The hash stays server-side.
    assert!(created.get("password_hash").is_none());

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/v1/users/{}", user_id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(request("DELETE", &format!("/api/v1/users/{}", user_id), None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn role_assignment_over_http() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let role = create_role(&app, "auditor").await?;
    let role_id = role["id"].as_str().expect("role id").to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/users",
            Some(json!({
                "email": "grace@example.com",
                "password": "correct horse battery",
                "first_name": "Grace",
                "last_name": "Hopper"
            })),
        ))
        .await?;
    let user = json_body(response).await?;
    let user_id = user["id"].as_str().expect("user id").to_string();

    let grant_uri = format!("/api/v1/users/{}/roles/{}", user_id, role_id);

    let response = app.clone().oneshot(request("POST", &grant_uri, None)).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(request("POST", &grant_uri, None)).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.clone().oneshot(request("DELETE", &grant_uri, None)).await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(request("DELETE", &grant_uri, None)).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn occupied_tenant_delete_yields_409() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/tenants",
            Some(json!({"name": "Acme"})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tenant = json_body(response).await?;
    let tenant_id = tenant["id"].as_str().expect("tenant id").to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/users",
            Some(json!({
                "email": "ada@example.com",
                "password": "correct horse battery",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "tenant_id": tenant_id
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request(
            "DELETE",
            &format!("/api/v1/tenants/{}", tenant_id),
            None,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> Result<()> {
    let (app, _db) = setup_test_app().await?;

    let response = app
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await?;
    assert!(body["paths"]["/api/v1/roles"].is_object());
    Ok(())
}
