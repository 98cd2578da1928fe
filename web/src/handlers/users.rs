//! User endpoints.
//!
//! - `POST /users/register`: create an account
//! - `POST /users/login`: exchange credentials for a bearer token
//! - `GET /users/:id`: read a user (auth)
//! - `PUT /users/update`: change the caller's account (auth)
//! - `DELETE /users/delete`: remove the caller and all their todos (auth)

use super::{require, require_if_present};
use crate::error::AppError;
use crate::extractors::{AuthUser, ValidJson};
use crate::model::{NewUser, User, UserChanges};
use crate::repository::Repository;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use todolist_auth::{AuthError, hash_password, verify_password};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /users/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Optional display name
    pub username: Option<String>,
    /// Login email
    pub email: String,
    /// Plain password, hashed before storage
    pub password: String,
}

/// Answer to a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Id of the new user
    pub id: i64,
    /// Confirmation text
    pub message: String,
}

/// Body of `POST /users/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain password
    pub password: String,
}

/// Signed bearer token.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Token for the `Authorization: Bearer` header
    pub token: String,
}

/// Body of `PUT /users/update`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name
    pub username: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New plain password
    pub password: Option<String>,
}

/// Answer to `DELETE /users/delete`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    /// Confirmation text
    pub message: String,
    /// Todos removed along with the user
    pub deleted_todos: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a user.
///
/// # Errors
///
/// 422 for a blank email or password, 400 if the email is taken.
#[tracing::instrument(skip_all, fields(email = %request.email))]
pub async fn register<R: Repository>(
    State(state): State<AppState<R>>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    require("email", &request.email)?;
    require("password", &request.password)?;

    let user = state
        .repo
        .create_user(NewUser {
            username: request.username,
            email: request.email.trim().to_string(),
            password_hash: hash_password(&request.password)?,
            created_at: state.clock.now(),
        })
        .await?;

    metrics::counter!("http.users.registered").increment(1);
    tracing::info!(user_id = user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            message: "User registered successfully.".to_string(),
        }),
    ))
}

/// Log in and receive a bearer token.
///
/// # Errors
///
/// 404 for an unknown email, 401 for a wrong password, 500 when the server
/// has no signing secret.
#[tracing::instrument(skip_all, fields(email = %request.email))]
pub async fn login<R: Repository>(
    State(state): State<AppState<R>>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    require("email", &request.email)?;
    require("password", &request.password)?;

    let user = state
        .repo
        .find_user_by_email(request.email.trim())
        .await?
        .ok_or_else(|| AppError::new(StatusCode::NOT_FOUND, "User not found", "NOT_FOUND"))?;

    if !verify_password(&request.password, &user.password_hash) {
        metrics::counter!("http.users.login_failed").increment(1);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.signer.issue(user.id, state.clock.now())?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(TokenResponse { token }))
}

/// Read a user, including the stored password hash.
///
/// # Errors
///
/// 404 for an unknown id.
pub async fn get_user<R: Repository>(
    State(state): State<AppState<R>>,
    _caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<User>, AppError> {
    state
        .repo
        .find_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User", id))
}

/// Update the caller's account.
///
/// # Errors
///
/// 422 for a blank email or password, 400 if the new email is taken, 404 if
/// the caller no longer exists.
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
pub async fn update_user<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
    ValidJson(request): ValidJson<UpdateUserRequest>,
) -> Result<Json<User>, AppError> {
    require_if_present("email", request.email.as_deref())?;
    require_if_present("password", request.password.as_deref())?;

    let changes = UserChanges {
        username: request.username,
        email: request.email.map(|email| email.trim().to_string()),
        password_hash: request.password.as_deref().map(hash_password).transpose()?,
    };
    let user = state.repo.update_user(caller.user_id, changes).await?;

    tracing::info!("User updated");
    Ok(Json(user))
}

/// Delete the caller and every todo they own.
///
/// # Errors
///
/// 404 if the caller no longer exists.
#[tracing::instrument(skip_all, fields(user_id = caller.user_id))]
pub async fn delete_user<R: Repository>(
    State(state): State<AppState<R>>,
    caller: AuthUser,
) -> Result<Json<DeleteUserResponse>, AppError> {
    let deleted_todos = state.repo.delete_user(caller.user_id).await?;

    tracing::info!(deleted_todos, "User deleted");
    Ok(Json(DeleteUserResponse {
        message: "User deleted successfully.".to_string(),
        deleted_todos,
    }))
}
