/// User administration endpoints
///
/// Responses never include the password hash; handlers convert every
/// [`User`] into a [`UserResponse`] first.
///
/// # Endpoints
///
/// | Method & Path | Roles |
/// |---------------|-------|
/// | `GET /users` | admin |
/// | `POST /users` | admin |
/// | `PUT /users/:id` | admin, manager |
/// | `DELETE /users/:id` | admin |

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::tasks::MessageResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskgate_shared::{
    auth::{password, principal::Principal},
    models::user::{CreateUser, Role, UpdateUser, User},
};
use validator::Validate;

const ADMIN_ROLES: &[Role] = &[Role::Admin];
const UPDATE_ROLES: &[Role] = &[Role::Admin, Role::Manager];

const USER_NOT_FOUND: &str = "Usuário não encontrado";

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Create user request
///
/// Every field is required; they are optional here so a missing field
/// produces the domain message instead of a deserialization error.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(max = 255, message = "Nome deve ter no máximo 255 caracteres"))]
    pub name: Option<String>,

    #[validate(
        email(message = "E-mail inválido"),
        length(max = 255, message = "E-mail deve ter no máximo 255 caracteres")
    )]
    pub email: Option<String>,

    pub password: Option<String>,

    pub role: Option<Role>,
}

/// Update user request
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "Nome deve ter entre 1 e 255 caracteres"))]
    pub name: Option<String>,

    pub password: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Lists all users in id order
pub async fn list_users(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    state.authorizer.authorize(principal.as_deref(), ADMIN_ROLES)?;

    let users = User::list(state.db.as_ref()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Creates a user
///
/// # Errors
///
/// - `400 Bad Request`: A field is missing, the email is malformed or the role is unknown
/// - `409 Conflict`: Email already registered
pub async fn create_user(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    state.authorizer.authorize(principal.as_deref(), ADMIN_ROLES)?;
    let Json(req) = body?;

    if is_blank(&req.name) || is_blank(&req.email) || is_blank(&req.password) || req.role.is_none()
    {
        return Err(ApiError::BadRequest(
            "Todos os campos são obrigatórios".to_string(),
        ));
    }
    req.validate()?;

    let CreateUserRequest {
        name: Some(name),
        email: Some(email),
        password: Some(password),
        role: Some(role),
    } = req
    else {
        return Err(ApiError::BadRequest(
            "Todos os campos são obrigatórios".to_string(),
        ));
    };

    let password_hash = password::hash_password(&password)?;

    let user = User::create(
        state.db.as_ref(),
        CreateUser {
            name,
            email,
            password_hash,
            role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Updates a user's name and/or password
///
/// A blank name is rejected; an empty password leaves the stored hash alone.
pub async fn update_user(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    state.authorizer.authorize(principal.as_deref(), UPDATE_ROLES)?;
    let Path(id) = id?;
    let Json(req) = body?;

    if req.name.as_ref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApiError::BadRequest("Nome não pode ser vazio".to_string()));
    }
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) if !password.is_empty() => Some(password::hash_password(password)?),
        _ => None,
    };

    let user = User::update(
        state.db.as_ref(),
        id,
        UpdateUser {
            name: req.name,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    tracing::info!(user_id = user.id, "User updated");

    Ok(Json(UserResponse::from(user)))
}

/// Deletes a user
pub async fn delete_user(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    state.authorizer.authorize(principal.as_deref(), ADMIN_ROLES)?;
    let Path(id) = id?;

    if !User::delete(state.db.as_ref(), id).await? {
        return Err(ApiError::NotFound(USER_NOT_FOUND.to_string()));
    }

    tracing::info!(user_id = id, "User deleted");

    Ok(Json(MessageResponse {
        message: "Usuário removido com sucesso".to_string(),
    }))
}
