/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/login` - Exchange email and password for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserResponse,
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use taskgate_shared::{
    auth::{jwt, password},
    models::user::User,
};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Usuário ou senha inválidos";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "E-mail é obrigatório"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,

    /// The authenticated user (no password)
    pub user: UserResponse,
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// {
///   "email": "admin@example.com",
///   "password": "admin123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": 1, "name": "Admin", "email": "admin@example.com", "role": "admin" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Malformed body or empty fields
/// - `401 Unauthorized`: Unknown email or wrong password (same message for both)
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = body?;
    req.validate()?;

    let Some(user) = User::find_by_email(state.db.as_ref(), &req.email).await? else {
        // Same Argon2id cost as a wrong password
        password::verify_placeholder(&req.password);
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let claims = jwt::Claims::with_expiration(user.id, user.role, state.config.jwt_expiration())?;
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: UserResponse::from(user),
    }))
}
