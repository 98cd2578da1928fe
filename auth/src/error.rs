//! Error types for authentication operations.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failure modes of token and credential checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Token Errors
    // ═══════════════════════════════════════════════════════════

    /// The token is malformed or its signature does not match.
    #[error("Invalid token")]
    InvalidToken,

    /// The token was valid once but its expiry has passed.
    #[error("Token has expired")]
    TokenExpired,

    // ═══════════════════════════════════════════════════════════
    // Credential Errors
    // ═══════════════════════════════════════════════════════════

    /// Password does not match the stored hash.
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// No signing secret is configured on the server.
    #[error("Token secret is not configured")]
    SecretNotConfigured,

    /// Internal failure (serialization, key setup).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    /// Returns `true` for errors caused by the client's credential rather
    /// than by the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::TokenExpired | Self::InvalidCredentials
        )
    }
}
