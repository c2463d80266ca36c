//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for the HTTP suites:
//! - An in-memory database behind the real router
//! - JWT token generation per role
//! - A request helper returning status and JSON body

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use taskgate_api::app::{build_router, AppState};
use taskgate_api::config::{Config, PolicyConfig};
use taskgate_shared::auth::authorization::AuthorizationPolicy;
use taskgate_shared::auth::jwt::{create_token, Claims};
use taskgate_shared::auth::password::hash_password;
use taskgate_shared::db::memory::MemoryAdapter;
use taskgate_shared::models::user::{CreateUser, Role, User};
use taskgate_shared::validation::TaskValidator;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: Arc<MemoryAdapter>,
    pub app: Router,
    pub config: Config,
}

impl TestContext {
    /// Lenient validator, role-based authorization
    pub fn new() -> Self {
        Self::with_policies(TaskValidator::Lenient, AuthorizationPolicy::RoleBased)
    }

    pub fn with_policies(task_validator: TaskValidator, authorization: AuthorizationPolicy) -> Self {
        let mut config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgresql://unused/test".to_string()),
            "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
            _ => None,
        })
        .expect("test configuration should load");
        config.policies = PolicyConfig {
            task_validator,
            authorization,
        };

        let db = Arc::new(MemoryAdapter::new());
        let app = build_router(AppState::new(db.clone(), config.clone()));

        Self { db, app, config }
    }

    /// Signed token for an arbitrary user id and role
    pub fn token(&self, user_id: i64, role: Role) -> String {
        create_token(&Claims::new(user_id, role), TEST_JWT_SECRET).expect("token should sign")
    }

    /// Inserts a user with a real password hash
    pub async fn create_user(&self, email: &str, password: &str, role: Role) -> User {
        User::create(
            self.db.as_ref(),
            CreateUser {
                name: format!("{} user", role),
                email: email.to_string(),
                password_hash: hash_password(password).expect("hash should succeed"),
                role,
            },
        )
        .await
        .expect("user should be created")
    }

    /// Sends a request and returns the status with the parsed JSON body
    ///
    /// An empty body comes back as `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Sends a prepared request
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }
}
