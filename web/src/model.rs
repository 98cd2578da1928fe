//! Records kept by the service.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A registered account.
///
/// Serializes with the stored password hash under `password`, which is what
/// `GET /users/:id` exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Auto-increment id.
    pub id: i64,
    /// Optional display name.
    pub username: Option<String>,
    /// Unique login email.
    pub email: String,
    /// Salted hash, never the plain password.
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Fields of a user about to be created.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Optional display name.
    pub username: Option<String>,
    /// Login email.
    pub email: String,
    /// Hash produced by [`todolist_auth::hash_password`].
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Partial update of a user; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New display name.
    pub username: Option<String>,
    /// New email, still unique.
    pub email: Option<String>,
    /// New password hash.
    pub password_hash: Option<String>,
}

/// A todo owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Auto-increment id.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Free text body.
    pub content: Option<String>,
    /// Done flag.
    pub completed: bool,
    /// Visible to others.
    pub published: bool,
    /// Owner.
    pub user_id: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Fields of a todo about to be created.
#[derive(Debug, Clone)]
pub struct NewTodo {
    /// Short title.
    pub title: String,
    /// Free text body.
    pub content: Option<String>,
    /// Done flag.
    pub completed: bool,
    /// Visible to others.
    pub published: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Partial update of a todo; `None` keeps the current value.
#[derive(Debug, Clone)]
pub struct TodoChanges {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New done flag.
    pub completed: Option<bool>,
    /// New visibility.
    pub published: Option<bool>,
    /// Modification time.
    pub updated_at: DateTime<Utc>,
}

impl TodoChanges {
    /// Apply the changes to `todo`.
    pub fn apply(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(content) = self.content {
            todo.content = Some(content);
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        if let Some(published) = self.published {
            todo.published = published;
        }
        todo.updated_at = self.updated_at;
    }
}

impl UserChanges {
    /// Apply the changes to `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = Some(username);
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
    }
}
