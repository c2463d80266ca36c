//! Login and bearer authentication tests
//!
//! Runs against the full router backed by the in-memory adapter.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{TestContext, TEST_JWT_SECRET};
use serde_json::json;
use taskgate_shared::auth::jwt::{create_token, validate_token, Claims};
use taskgate_shared::models::user::Role;

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let ctx = TestContext::new();
    let admin = ctx.create_user("admin@example.com", "admin123", Role::Admin).await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "admin@example.com", "password": "admin123" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], admin.id);
    assert_eq!(body["user"]["email"], "admin@example.com");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("password_hash").is_none());

    let token = body["token"].as_str().unwrap();
    let claims = validate_token(token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.id, admin.id);
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn test_login_token_drives_task_lifecycle() {
    let ctx = TestContext::new();
    ctx.create_user("manager@example.com", "manager123", Role::Manager).await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "manager@example.com", "password": "manager123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx.send(Method::GET, "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, created) = ctx
        .send(
            Method::POST,
            "/tasks",
            Some(&token),
            Some(json!({ "title": "Buy milk" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Buy milk");
    assert_eq!(created["status"], "pending");

    let uri = format!("/tasks/{}", created["id"]);

    let (status, fetched) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tarefa não encontrada");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let ctx = TestContext::new();
    ctx.create_user("admin@example.com", "admin123", Role::Admin).await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "admin@example.com", "password": "wrong" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Usuário ou senha inválidos");
}

#[tokio::test]
async fn test_login_unknown_email() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "whatever" })),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Usuário ou senha inválidos");
}

#[tokio::test]
async fn test_login_malformed_body() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_missing_authorization_header() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/tasks", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token ausente");
}

#[tokio::test]
async fn test_scheme_without_token() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/tasks")
        .header(header::AUTHORIZATION, "Bearer")
        .body(Body::empty())
        .unwrap();
    let (status, body) = ctx.send_request(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token inválido");
}

#[tokio::test]
async fn test_invalid_token_is_forbidden() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .send(Method::GET, "/tasks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Token inválido ou expirado");

    let foreign = create_token(
        &Claims::new(1, Role::Admin),
        "another-secret-key-at-least-32-bytes",
    )
    .unwrap();
    let (status, _) = ctx.send(Method::GET, "/tasks", Some(&foreign), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expired_token_is_forbidden() {
    let ctx = TestContext::new();

    let claims = Claims::with_expiration(1, Role::Admin, chrono::Duration::seconds(-60)).unwrap();
    let token = create_token(&claims, TEST_JWT_SECRET).unwrap();

    let (status, body) = ctx.send(Method::GET, "/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Token inválido ou expirado");
}

#[tokio::test]
async fn test_health_is_public() {
    let ctx = TestContext::new();

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
