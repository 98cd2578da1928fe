//! # Todolist Client
//!
//! A todo list with a trash, persisted as JSON in a key-value store and
//! driven through the reducer architecture:
//!
//! - [`types`]: todo items, the active list, the trash, actions
//! - [`reducer`]: validation and mutation, one save effect per change
//! - [`persistence`]: key-value stores and the save/load adapter
//! - [`controller`]: dispatch, wait for the save, redraw
//! - [`view`]: what the controller draws on and how it asks for confirmation
//! - [`shell`]: the command language of the `todolist` binary
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todolist_client::{MemoryStorage, Persistence, SyncController, TextView, TodoEnvironment};
//! use todolist_core::environment::{SystemClock, TimestampIds};
//!
//! # async fn example() -> Result<(), todolist_client::ClientError> {
//! let persistence = Persistence::new(Arc::new(MemoryStorage::new()));
//! let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(TimestampIds::new()), persistence);
//! let mut controller = SyncController::load(env, TextView::new(std::io::stdout())).await?;
//!
//! controller.add("Buy milk").await?;
//! controller.search("milk").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod persistence;
pub mod reducer;
pub mod shell;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use config::ClientConfig;
pub use controller::{Screen, SyncController, TodoStore};
pub use error::ClientError;
pub use persistence::{FileStorage, KeyValueStore, MemoryStorage, Persistence, PersistenceError};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{Confirmed, TodoAction, TodoError, TodoId, TodoItem, TodoList, TodoState, Trash};
pub use view::{Confirm, ListView, TextView, View};
