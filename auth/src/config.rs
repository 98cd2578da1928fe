//! Token configuration.
//!
//! The signing secret comes from the deployment, never from code. A missing
//! secret is a valid configuration: the server starts, and every request
//! that needs a token fails with [`AuthError::SecretNotConfigured`](crate::AuthError).

use chrono::Duration;
use std::env;

/// Bearer token configuration.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret used to sign and verify tokens.
    pub secret: Option<String>,

    /// Token time-to-live.
    ///
    /// Default: 1 hour
    pub ttl: Duration,
}

impl TokenConfig {
    /// Create a configuration signing with `secret`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            ttl: Duration::hours(1),
        }
    }

    /// Load from `JWT_SECRET` and `TOKEN_TTL_SECS`.
    ///
    /// An empty `JWT_SECRET` counts as unset.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            ttl: env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map_or(defaults.ttl, Duration::seconds),
        }
    }

    /// Set token time-to-live.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: None,
            ttl: Duration::hours(1),
        }
    }
}

// The secret never ends up in logs
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("ttl", &self.ttl)
            .finish()
    }
}
