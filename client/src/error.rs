//! Errors of the todo list client.

use crate::persistence::PersistenceError;
use thiserror::Error;
use todolist_runtime::StoreError;

/// Failures that end a controller operation
///
/// Rejected user actions are not errors at this level; they are shown as
/// warnings and the client carries on.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The store refused the action
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Persisted state could not be loaded
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// The view could not be written
    #[error("view output failed: {0}")]
    View(#[from] std::io::Error),
}
