//! Storage seams for users and todos.
//!
//! Handlers only see these traits. Every todo operation is scoped to the
//! owning user: a todo that exists but belongs to someone else is reported
//! exactly like one that does not exist.

mod memory;

pub use memory::InMemoryRepository;

use crate::model::{NewTodo, NewUser, Todo, TodoChanges, User, UserChanges};
use std::future::Future;
use thiserror::Error;

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Errors raised by a repository.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Another user already has this email.
    #[error("A user with email {0} already exists")]
    DuplicateEmail(String),

    /// No matching record (for todos: none owned by the caller).
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// Kind of record, e.g. `"Todo"`.
        resource: &'static str,
        /// Requested id.
        id: i64,
    },

    /// The storage layer failed.
    #[error("Storage error: {0}")]
    Internal(String),
}

/// User accounts.
pub trait UserRepository: Send + Sync {
    /// Insert a user and assign its id.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::DuplicateEmail`] if the email is taken.
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User>> + Send;

    /// Look a user up by id.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Internal`] if storage fails.
    fn find_user(&self, id: i64) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Look a user up by email.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Internal`] if storage fails.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>>> + Send;

    /// Apply `changes` to a user.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] for an unknown id,
    /// [`RepositoryError::DuplicateEmail`] if the new email belongs to
    /// another user.
    fn update_user(
        &self,
        id: i64,
        changes: UserChanges,
    ) -> impl Future<Output = Result<User>> + Send;

    /// Remove a user together with every todo they own.
    ///
    /// Returns the number of todos removed.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] for an unknown id.
    fn delete_user(&self, id: i64) -> impl Future<Output = Result<usize>> + Send;
}

/// Todos, always scoped to an owner.
pub trait TodoRepository: Send + Sync {
    /// Insert a todo for `user_id` and assign its id.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if `user_id` is not a user,
    /// [`RepositoryError::Internal`] if storage fails.
    fn create_todo(
        &self,
        user_id: i64,
        todo: NewTodo,
    ) -> impl Future<Output = Result<Todo>> + Send;

    /// All todos of `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Internal`] if storage fails.
    fn list_todos(&self, user_id: i64) -> impl Future<Output = Result<Vec<Todo>>> + Send;

    /// One todo of `user_id`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Internal`] if storage fails.
    fn find_todo(
        &self,
        user_id: i64,
        id: i64,
    ) -> impl Future<Output = Result<Option<Todo>>> + Send;

    /// Apply `changes` to a todo of `user_id`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if the caller owns no such todo.
    fn update_todo(
        &self,
        user_id: i64,
        id: i64,
        changes: TodoChanges,
    ) -> impl Future<Output = Result<Todo>> + Send;

    /// Delete a todo of `user_id`.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::NotFound`] if the caller owns no such todo.
    fn delete_todo(&self, user_id: i64, id: i64) -> impl Future<Output = Result<()>> + Send;

    /// Delete every todo of `user_id` and return how many there were.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::Internal`] if storage fails.
    fn delete_todos(&self, user_id: i64) -> impl Future<Output = Result<usize>> + Send;
}

/// Everything the router needs from storage.
pub trait Repository: UserRepository + TodoRepository + Clone + 'static {}

impl<T> Repository for T where T: UserRepository + TodoRepository + Clone + 'static {}
