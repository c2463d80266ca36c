/// Task endpoints
///
/// Every handler authorizes the caller against the route's role set before
/// touching storage. Writes run the configured
/// [`TaskValidator`](taskgate_shared::validation::TaskValidator) first.
///
/// # Endpoints
///
/// | Method & Path | Roles |
/// |---------------|-------|
/// | `GET /tasks` | admin, manager, viewer |
/// | `GET /tasks/:id` | admin, manager, viewer |
/// | `POST /tasks` | admin, manager |
/// | `PUT /tasks/:id` | admin, manager |
/// | `DELETE /tasks/:id` | admin, manager |

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
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
    auth::principal::Principal,
    models::{
        task::{CreateTask, Task, TaskStatus, UpdateTask},
        user::Role,
    },
};

const READ_ROLES: &[Role] = &[Role::Admin, Role::Manager, Role::Viewer];
const WRITE_ROLES: &[Role] = &[Role::Admin, Role::Manager];

const TASK_NOT_FOUND: &str = "Tarefa não encontrada";

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Update task request
///
/// Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

/// Confirmation body for deletes
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Lists all tasks, newest first
pub async fn list_tasks(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Json<Vec<Task>>> {
    state.authorizer.authorize(principal.as_deref(), READ_ROLES)?;

    let tasks = Task::list(state.db.as_ref()).await?;
    Ok(Json(tasks))
}

/// Fetches one task
pub async fn get_task(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Task>> {
    state.authorizer.authorize(principal.as_deref(), READ_ROLES)?;
    let Path(id) = id?;

    let task = Task::find_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    Ok(Json(task))
}

/// Creates a task with status `pending`
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed (first failing rule)
/// - `403 Forbidden`: Role not allowed to write
pub async fn create_task(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    state.authorizer.authorize(principal.as_deref(), WRITE_ROLES)?;
    let Json(req) = body?;

    state
        .validator
        .validate(req.title.as_deref(), req.description.as_deref())?;

    let task = Task::create(
        state.db.as_ref(),
        CreateTask {
            title: req.title.unwrap_or_default(),
            description: req.description,
            status: TaskStatus::Pending,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, "Task created");

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially updates a task
///
/// Supplied fields are merged over the stored task; when the title or the
/// description changes the merged pair is validated. Only supplied fields are
/// written.
pub async fn update_task(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    state.authorizer.authorize(principal.as_deref(), WRITE_ROLES)?;
    let Path(id) = id?;
    let Json(req) = body?;

    let existing = Task::find_by_id(state.db.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    if req.title.is_some() || req.description.is_some() {
        let title = req.title.as_deref().unwrap_or(&existing.title);
        let description = req
            .description
            .as_deref()
            .or(existing.description.as_deref());
        state.validator.validate(Some(title), description)?;
    }

    // No row-level lock: a concurrent write between the read above and this
    // update wins or loses silently
    let task = Task::update(
        state.db.as_ref(),
        id,
        UpdateTask {
            title: req.title,
            description: req.description,
            status: req.status,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound(TASK_NOT_FOUND.to_string()))?;

    tracing::info!(task_id = task.id, status = %task.status, "Task updated");

    Ok(Json(task))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    state.authorizer.authorize(principal.as_deref(), WRITE_ROLES)?;
    let Path(id) = id?;

    if !Task::delete(state.db.as_ref(), id).await? {
        return Err(ApiError::NotFound(TASK_NOT_FOUND.to_string()));
    }

    tracing::info!(task_id = id, "Task deleted");

    Ok(Json(MessageResponse {
        message: "Tarefa removida com sucesso".to_string(),
    }))
}
