//! Task endpoint tests
//!
//! Covers the CRUD lifecycle, both validators and the three authorization
//! policies.

mod common;

use axum::http::{Method, StatusCode};
use common::TestContext;
use serde_json::{json, Value};
use taskgate_shared::auth::authorization::AuthorizationPolicy;
use taskgate_shared::models::user::Role;
use taskgate_shared::validation::TaskValidator;

async fn create_task(ctx: &TestContext, token: &str, body: Value) -> Value {
    let (status, task) = ctx.send(Method::POST, "/tasks", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {}", task);
    task
}

#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Manager);

    let task = create_task(
        &ctx,
        &token,
        json!({ "title": "Write report", "description": "Quarterly numbers" }),
    )
    .await;
    assert_eq!(task["title"], "Write report");
    assert_eq!(task["description"], "Quarterly numbers");
    assert_eq!(task["status"], "pending");
    assert!(task["created_at"].is_string());

    let uri = format!("/tasks/{}", task["id"]);

    let (status, fetched) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, task);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tarefa removida com sucesso");

    let (status, body) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tarefa não encontrada");

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_newest_first() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Admin);

    create_task(&ctx, &token, json!({ "title": "First" })).await;
    create_task(&ctx, &token, json!({ "title": "Second" })).await;

    let viewer = ctx.token(2, Role::Viewer);
    let (status, body) = ctx.send(Method::GET, "/tasks", Some(&viewer), None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Manager);

    let task = create_task(
        &ctx,
        &token,
        json!({ "title": "Original", "description": "Keep me" }),
    )
    .await;
    let uri = format!("/tasks/{}", task["id"]);

    let (status, updated) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "status": "done" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "done");
    assert_eq!(updated["title"], "Original");
    assert_eq!(updated["description"], "Keep me");

    let (status, updated) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "title": "Renamed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
    assert_eq!(updated["status"], "done");
    assert_eq!(updated["description"], "Keep me");
}

#[tokio::test]
async fn test_update_validates_merged_task() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Admin);

    let task = create_task(&ctx, &token, json!({ "title": "Original" })).await;
    let uri = format!("/tasks/{}", task["id"]);

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "title": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Título é obrigatório");

    let (_, unchanged) = ctx.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(unchanged["title"], "Original");
}

#[tokio::test]
async fn test_update_unknown_task() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Admin);

    let (status, body) = ctx
        .send(Method::PUT, "/tasks/999", Some(&token), Some(json!({ "status": "done" })))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Tarefa não encontrada");
}

#[tokio::test]
async fn test_lenient_validation() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Admin);

    let (status, body) = ctx
        .send(Method::POST, "/tasks", Some(&token), Some(json!({ "description": "x" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Título é obrigatório");
    assert_eq!(body["details"][0]["field"], "title");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/tasks",
            Some(&token),
            Some(json!({ "title": "a".repeat(201) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Título não pode ter mais de 200 caracteres");

    let (status, body) = ctx
        .send(
            Method::POST,
            "/tasks",
            Some(&token),
            Some(json!({ "title": "ok", "description": "d".repeat(1001) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Descrição não pode ter mais de 1000 caracteres");

    // Short titles and missing descriptions are fine
    let task = create_task(&ctx, &token, json!({ "title": "ok" })).await;
    assert!(task["description"].is_null());
}

#[tokio::test]
async fn test_strict_validation() {
    let ctx = TestContext::with_policies(TaskValidator::Strict, AuthorizationPolicy::RoleBased);
    let token = ctx.token(1, Role::Admin);

    let cases = [
        (json!({ "title": "abc", "description": "long enough text" }), "Título deve ter pelo menos 5 caracteres"),
        (json!({ "title": "A proper title" }), "Descrição é obrigatória"),
        (json!({ "title": "A proper title", "description": "short" }), "Descrição deve ter pelo menos 10 caracteres"),
    ];

    for (body, message) in cases {
        let (status, response) = ctx.send(Method::POST, "/tasks", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], message);
    }

    create_task(
        &ctx,
        &token,
        json!({ "title": "A proper title", "description": "long enough text" }),
    )
    .await;
}

#[tokio::test]
async fn test_viewer_cannot_write() {
    let ctx = TestContext::new();
    let viewer = ctx.token(3, Role::Viewer);

    let (status, body) = ctx
        .send(Method::POST, "/tasks", Some(&viewer), Some(json!({ "title": "Nope" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Permissão negada: você não tem o papel necessário para acessar este recurso"
    );

    let (status, _) = ctx.send(Method::DELETE, "/tasks/1", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_only_policy() {
    let ctx = TestContext::with_policies(TaskValidator::Lenient, AuthorizationPolicy::AdminOnly);

    let manager = ctx.token(2, Role::Manager);
    let (status, body) = ctx.send(Method::GET, "/tasks", Some(&manager), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Permissão negada: apenas administradores podem acessar este recurso"
    );

    let admin = ctx.token(1, Role::Admin);
    create_task(&ctx, &admin, json!({ "title": "Admin task" })).await;
    let (status, _) = ctx.send(Method::GET, "/tasks", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_hierarchical_policy() {
    let ctx = TestContext::with_policies(TaskValidator::Lenient, AuthorizationPolicy::Hierarchical);

    let manager = ctx.token(2, Role::Manager);
    create_task(&ctx, &manager, json!({ "title": "Manager task" })).await;

    let viewer = ctx.token(3, Role::Viewer);
    let (status, _) = ctx.send(Method::GET, "/tasks", Some(&viewer), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = ctx
        .send(Method::POST, "/tasks", Some(&viewer), Some(json!({ "title": "Nope" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Permissão negada: seu nível de acesso é insuficiente"
    );

    // Users listing requires admin level
    let (status, _) = ctx.send(Method::GET, "/users", Some(&manager), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_non_numeric_id() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Admin);

    let (status, body) = ctx.send(Method::GET, "/tasks/abc", Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "ID inválido");
}

#[tokio::test]
async fn test_unknown_status_rejected() {
    let ctx = TestContext::new();
    let token = ctx.token(1, Role::Admin);

    let task = create_task(&ctx, &token, json!({ "title": "Original" })).await;
    let uri = format!("/tasks/{}", task["id"]);

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "status": "archived" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
