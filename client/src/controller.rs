//! Render/sync controller.
//!
//! Owns the store and the view. Every mutating call dispatches one action,
//! waits until its save has finished, reports warnings and redraws the
//! current screen from scratch.

use crate::error::ClientError;
use crate::persistence::Persistence;
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::types::{Confirmed, TodoAction, TodoError, TodoId, TodoState};
use crate::view::{Confirm, ListView, View};
use std::time::Duration;
use todolist_runtime::Store;
use tokio::sync::broadcast::{self, error::TryRecvError};

/// The store type driven by the controller
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Which collection the view is currently showing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    /// The active list, under the current filter
    List,
    /// The trash
    Trash,
}

/// Keeps store, persisted state and view in step
pub struct SyncController<V: View> {
    store: TodoStore,
    notifications: broadcast::Receiver<TodoAction>,
    view: V,
    filter: String,
    screen: Screen,
}

impl<V: View> SyncController<V> {
    /// Loads persisted collections, builds the store and draws the list
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted state cannot be read or the view
    /// cannot be drawn.
    pub async fn load(env: TodoEnvironment, view: V) -> Result<Self, ClientError> {
        let persistence: &Persistence = &env.persistence;
        let (todos, trash) = persistence.load()?;
        let state = TodoState::new(todos, trash);
        if let Some(max_id) = state.max_id() {
            env.ids.observe(max_id.get());
        }
        tracing::info!(
            todos = state.todos.len(),
            trash = state.trash.len(),
            trash_enabled = env.trash_enabled,
            "Todo list loaded"
        );

        let store = Store::new(state, TodoReducer::new(), env);
        let notifications = store.subscribe();
        let mut controller = Self {
            store,
            notifications,
            view,
            filter: String::new(),
            screen: Screen::List,
        };
        controller.redraw().await?;
        Ok(controller)
    }

    /// Adds a todo
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn add(&mut self, text: &str) -> Result<(), ClientError> {
        self.dispatch(
            TodoAction::AddTodo {
                text: text.to_string(),
            },
            Screen::List,
        )
        .await
    }

    /// Flips the completed flag of a todo
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn toggle(&mut self, id: TodoId) -> Result<(), ClientError> {
        self.dispatch(TodoAction::ToggleCompleted { id }, Screen::List)
            .await
    }

    /// Starts editing a todo, or commits the running edit with `new_text`
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn edit(&mut self, id: TodoId, new_text: Option<&str>) -> Result<(), ClientError> {
        self.dispatch(
            TodoAction::BeginOrCommitEdit {
                id,
                new_text: new_text.map(str::to_string),
            },
            Screen::List,
        )
        .await
    }

    /// Deletes a todo after the user confirmed
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn delete<C>(&mut self, id: TodoId, confirm: &mut C) -> Result<(), ClientError>
    where
        C: Confirm + ?Sized,
    {
        let Some(text) = self.store.state(|s| s.todos.get(id).map(|t| t.text.clone())).await
        else {
            self.view.warn(&TodoError::NotFound(id).to_string())?;
            return Ok(());
        };
        let Some(confirmed) =
            Confirmed::obtain(confirm, &format!("Delete todo \"{text}\"?"))
        else {
            return Ok(());
        };
        self.dispatch(TodoAction::DeleteTodo { id, confirmed }, Screen::List)
            .await
    }

    /// Empties the list after the user confirmed
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn clear<C>(&mut self, confirm: &mut C) -> Result<(), ClientError>
    where
        C: Confirm + ?Sized,
    {
        if self.store.state(|s| s.todos.is_empty()).await {
            self.view.warn(&TodoError::NothingToClear.to_string())?;
            return Ok(());
        }
        let Some(confirmed) = Confirmed::obtain(confirm, "Clear the whole todo list?") else {
            return Ok(());
        };
        self.dispatch(TodoAction::ClearTodos { confirmed }, Screen::List)
            .await
    }

    /// Moves a trashed todo back to the head of the list
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn restore(&mut self, id: TodoId) -> Result<(), ClientError> {
        self.dispatch(TodoAction::RestoreTodo { id }, Screen::Trash)
            .await
    }

    /// Destroys a trashed todo after the user confirmed
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shut down or the view fails.
    pub async fn purge<C>(&mut self, id: TodoId, confirm: &mut C) -> Result<(), ClientError>
    where
        C: Confirm + ?Sized,
    {
        let Some(text) = self.store.state(|s| s.trash.get(id).map(|t| t.text.clone())).await
        else {
            self.view.warn(&TodoError::NotFound(id).to_string())?;
            return Ok(());
        };
        let Some(confirmed) =
            Confirmed::obtain(confirm, &format!("Delete \"{text}\" forever?"))
        else {
            return Ok(());
        };
        self.dispatch(TodoAction::PurgeTodo { id, confirmed }, Screen::Trash)
            .await
    }

    /// Filters the list; an empty term shows everything
    ///
    /// The filter stays active across later mutations.
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub async fn search(&mut self, term: &str) -> Result<(), ClientError> {
        term.clone_into(&mut self.filter);
        self.screen = Screen::List;
        self.redraw().await
    }

    /// Shows the active list
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub async fn show_list(&mut self) -> Result<(), ClientError> {
        self.screen = Screen::List;
        self.redraw().await
    }

    /// Shows the trash
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub async fn show_trash(&mut self) -> Result<(), ClientError> {
        self.screen = Screen::Trash;
        self.redraw().await
    }

    /// Draws the current screen from the current state
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub async fn redraw(&mut self) -> Result<(), ClientError> {
        match self.screen {
            Screen::List => {
                let filter = self.filter.as_str();
                let list = self.store.state(|s| ListView::of_todos(&s.todos, filter)).await;
                self.view.render_list(&list)?;
            },
            Screen::Trash => {
                let trash = self.store.state(|s| ListView::of_trash(&s.trash)).await;
                self.view.render_trash(&trash)?;
            },
        }
        Ok(())
    }

    /// Shows an informational message
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub fn notify(&mut self, message: &str) -> Result<(), ClientError> {
        self.view.info(message)?;
        Ok(())
    }

    /// Shows a warning
    ///
    /// # Errors
    ///
    /// Returns an error if the view fails.
    pub fn warn(&mut self, message: &str) -> Result<(), ClientError> {
        self.view.warn(message)?;
        Ok(())
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }

    /// The active filter
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// The screen drawn by [`SyncController::redraw`]
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// The view
    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Stops the store, waiting up to `timeout` for saves in flight
    ///
    /// # Errors
    ///
    /// Returns an error if saves are still running when the timeout expires.
    pub async fn shutdown(self, timeout: Duration) -> Result<V, ClientError> {
        self.store.shutdown(timeout).await?;
        tracing::info!("Todo list closed");
        Ok(self.view)
    }

    async fn dispatch(&mut self, action: TodoAction, screen: Screen) -> Result<(), ClientError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;

        let changes = self.drain_notifications();
        tracing::trace!(changes, "Store changed");

        let (last_error, persist_error) = self
            .store
            .state(|s| (s.last_error.clone(), s.persist_error.clone()))
            .await;
        if let Some(error) = last_error {
            self.view.warn(&error.to_string())?;
        }
        if let Some(error) = persist_error {
            self.view.warn(&format!("Could not save todos: {error}"))?;
        }

        if changes > 0 {
            self.screen = screen;
            self.redraw().await?;
        }
        Ok(())
    }

    /// Consumes pending store-change notifications, returning how many arrived
    fn drain_notifications(&mut self) -> usize {
        let mut count: usize = 0;
        loop {
            match self.notifications.try_recv() {
                Ok(_) => count += 1,
                Err(TryRecvError::Lagged(skipped)) => {
                    count = count.saturating_add(usize::try_from(skipped).unwrap_or(usize::MAX));
                },
                Err(TryRecvError::Empty | TryRecvError::Closed) => return count,
            }
        }
    }
}
