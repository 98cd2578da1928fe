//! # Todolist Web
//!
//! REST service storing todos per user, behind bearer-token authentication.
//!
//! ```text
//! request ─▶ correlation id ─▶ trace ─▶ CORS ─▶ extractors ─▶ handler ─▶ repository
//!                                               (AuthUser,
//!                                                ValidJson)
//! ```
//!
//! Handlers are generic over the [`Repository`](repository::Repository), so
//! the same router runs on [`InMemoryRepository`](repository::InMemoryRepository)
//! or any other storage. Every failure becomes an [`AppError`] with a JSON
//! body `{"code": ..., "message": ...}`.
//!
//! ## Example
//!
//! ```no_run
//! use todolist_auth::{TokenConfig, TokenSigner};
//! use todolist_web::{AppState, build_router, repository::InMemoryRepository};
//!
//! # async fn example() -> std::io::Result<()> {
//! let state = AppState::new(
//!     InMemoryRepository::new(),
//!     TokenSigner::new(TokenConfig::new("secret")),
//! );
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, build_router(state)).await
//! # }
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use extractors::{AuthUser, BearerToken, CorrelationId, ValidJson};
pub use middleware::{CORRELATION_ID_HEADER, correlation_id_layer};
pub use router::build_router;
pub use state::AppState;
