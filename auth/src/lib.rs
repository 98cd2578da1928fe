//! # Todolist Authentication
//!
//! Credentials for the todolist service:
//!
//! - [`TokenSigner`]: issues and verifies HMAC-signed bearer tokens that
//!   carry the user id
//! - [`password`]: Argon2id password hashes in PHC string format
//! - [`AuthError`]: failure taxonomy, mapped to HTTP statuses by the web crate
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use todolist_auth::{TokenConfig, TokenSigner};
//!
//! let signer = TokenSigner::new(TokenConfig::new("secret"));
//! let token = signer.issue(7, Utc::now())?;
//! assert_eq!(signer.verify(&token, Utc::now())?.user_id(), 7);
//! # Ok::<(), todolist_auth::AuthError>(())
//! ```

pub mod config;
pub mod error;
pub mod password;
pub mod token;

pub use config::TokenConfig;
pub use error::{AuthError, Result};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenSigner};
