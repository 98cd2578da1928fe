//! Todo endpoints, all scoped to the authenticated caller.
//!
//! - `POST /todos`: create
//! - `GET /todos`: list the caller's todos
//! - `GET /todos/:id`, `PUT /todos/:id`, `DELETE /todos/:id`
//! - `DELETE /todos`: delete all of the caller's todos

use super::{MessageResponse, require, require_if_present};
use crate::error::AppError;
use crate::extractors::{AuthUser, ValidJson};
use crate::model::{NewTodo, Todo, TodoChanges};
use crate::repository::Repository;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /todos`.
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    /// Short title, required
    pub title: String,
    /// Free text body
    #[serde(default)]
    pub content: Option<String>,
    /// Defaults to `false`
    #[serde(default)]
    pub completed: bool,
    /// Defaults to `false`
    #[serde(default)]
    pub published: bool,
}

/// Body of `PUT /todos/:id`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    /// New title
    pub title: Option<String>,
    /// New body
    pub content: Option<String>,
    /// New done flag
    pub completed: Option<bool>,
    /// New visibility
    pub published: Option<bool>,
}

/// Answer to `DELETE /todos`.
#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    /// `Deleted N todos successfully.`
    pub message: String,
    /// Number of deleted todos
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a todo owned by the caller.
///
/// # Errors
///
/// 422 for a blank title.
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
pub async fn create_todo<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    ValidJson(request): ValidJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), AppError> {
    require("title", &request.title)?;

    let todo = state
        .repo
        .create_todo(
            caller.user_id,
            NewTodo {
                title: request.title,
                content: request.content,
                completed: request.completed,
                published: request.published,
                created_at: state.clock.now(),
            },
        )
        .await?;

    metrics::counter!("http.todos.created").increment(1);
    tracing::debug!(todo_id = todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// List the caller's todos, oldest first.
///
/// # Errors
///
/// 500 if storage fails.
pub async fn list_todos<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> Result<Json<Vec<Todo>>, AppError> {
    Ok(Json(state.repo.list_todos(caller.user_id).await?))
}

/// Read one of the caller's todos.
///
/// # Errors
///
/// 404 if the caller owns no todo with this id.
pub async fn get_todo<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, AppError> {
    state
        .repo
        .find_todo(caller.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Todo", id))
}

/// Change one of the caller's todos.
///
/// # Errors
///
/// 422 for a blank title, 404 if the caller owns no todo with this id.
#[tracing::instrument(skip_all, fields(user_id = caller.user_id, todo_id = id))]
pub async fn update_todo<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    Path(id): Path<i64>,
    ValidJson(request): ValidJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, AppError> {
    require_if_present("title", request.title.as_deref())?;

    let changes = TodoChanges {
        title: request.title,
        content: request.content,
        completed: request.completed,
        published: request.published,
        updated_at: state.clock.now(),
    };
    let todo = state.repo.update_todo(caller.user_id, id, changes).await?;

    metrics::counter!("http.todos.updated").increment(1);
    Ok(Json(todo))
}

/// Delete one of the caller's todos.
///
/// # Errors
///
/// 404 if the caller owns no todo with this id.
#[tracing::instrument(skip_all, fields(user_id = caller.user_id, todo_id = id))]
pub async fn delete_todo<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.repo.delete_todo(caller.user_id, id).await?;

    metrics::counter!("http.todos.deleted").increment(1);
    Ok(Json(MessageResponse::new("Todo deleted successfully.")))
}

/// Delete all of the caller's todos.
///
/// # Errors
///
/// 500 if storage fails.
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
pub async fn delete_all_todos<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> Result<Json<DeleteAllResponse>, AppError> {
    let count = state.repo.delete_todos(caller.user_id).await?;

    metrics::counter!("http.todos.deleted").increment(count as u64);
    tracing::info!(count, "Todos cleared");
    Ok(Json(DeleteAllResponse {
        message: format!("Deleted {count} todos successfully."),
        count,
    }))
}
