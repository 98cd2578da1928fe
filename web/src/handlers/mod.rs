//! HTTP request handlers, one module per resource.

pub mod health;
pub mod todos;
pub mod users;

use crate::error::AppError;
use serde::Serialize;

pub use health::health_check;

/// Body of responses that only report what happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Reject a blank required field with 422.
fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Like [`require`], for fields of partial updates.
fn require_if_present(field: &str, value: Option<&str>) -> Result<(), AppError> {
    value.map_or(Ok(()), |value| require(field, value))
}
