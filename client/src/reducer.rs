//! Reducer for the todo list.
//!
//! Validates user actions, mutates the collections and asks the runtime to
//! save both collections after every successful mutation.

use crate::persistence::Persistence;
use crate::types::{TodoAction, TodoError, TodoId, TodoItem, TodoState};
use chrono::{DateTime, FixedOffset, Local, Locale, Utc};
use std::sync::Arc;
use todolist_core::{
    SmallVec,
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    smallvec,
};

/// Creation label layout, e.g. `14:05 19 oktober 2026`
pub const CREATED_AT_FORMAT: &str = "%H:%M %-d %B %Y";

/// Renders the creation label in Swedish, in `offset` or the local time zone
#[must_use]
pub fn created_at_label(at: DateTime<Utc>, offset: Option<FixedOffset>) -> String {
    match offset {
        Some(offset) => at
            .with_timezone(&offset)
            .format_localized(CREATED_AT_FORMAT, Locale::sv_SE)
            .to_string(),
        None => at
            .with_timezone(&Local)
            .format_localized(CREATED_AT_FORMAT, Locale::sv_SE)
            .to_string(),
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for creation times
    pub clock: Arc<dyn Clock>,
    /// Source of fresh ids
    pub ids: Arc<dyn IdGenerator>,
    /// Where collections are saved
    pub persistence: Persistence,
    /// Deleted items go to the trash instead of disappearing
    pub trash_enabled: bool,
    /// Time zone of creation labels; `None` uses the local zone
    pub label_offset: Option<FixedOffset>,
}

impl TodoEnvironment {
    /// Creates an environment with the trash enabled and local-time labels
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>, persistence: Persistence) -> Self {
        Self {
            clock,
            ids,
            persistence,
            trash_enabled: true,
            label_offset: None,
        }
    }

    /// Enables or disables the trash
    #[must_use]
    pub const fn with_trash(mut self, enabled: bool) -> Self {
        self.trash_enabled = enabled;
        self
    }

    /// Renders creation labels at a fixed UTC offset
    #[must_use]
    pub const fn with_label_offset(mut self, offset: FixedOffset) -> Self {
        self.label_offset = Some(offset);
        self
    }
}

/// Reducer for the todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn reject(state: &mut TodoState, error: TodoError) -> SmallVec<[Effect<TodoAction>; 4]> {
        tracing::debug!(%error, "Action rejected");
        state.last_error = Some(error);
        SmallVec::new()
    }

    /// Saves a snapshot of both collections; a failure comes back as `PersistFailed`
    fn save(state: &TodoState, env: &TodoEnvironment) -> SmallVec<[Effect<TodoAction>; 4]> {
        let todos = state.todos.clone();
        let trash = state.trash.clone();
        let persistence = env.persistence.clone();

        smallvec![Effect::future(async move {
            // Storage writes block, keep them off the async workers
            let saved = tokio::task::spawn_blocking(move || {
                persistence.save(&todos, &trash).map_err(|e| e.to_string())
            })
            .await
            .map_err(|e| format!("save task failed: {e}"))
            .and_then(|result| result);

            match saved {
                Ok(()) => None,
                Err(error) => {
                    tracing::warn!(%error, "Saving todos failed, in-memory state kept");
                    Some(TodoAction::PersistFailed { error })
                },
            }
        })]
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        if action.is_user_action() {
            state.last_error = None;
            state.persist_error = None;
        }

        match action {
            TodoAction::AddTodo { text } => {
                let text = text.trim();
                if text.is_empty() {
                    return Self::reject(state, TodoError::EmptyText);
                }

                let now = env.clock.now();
                let id = TodoId::new(env.ids.next_id(now));
                let label = created_at_label(now, env.label_offset);
                state
                    .todos
                    .push_front(TodoItem::new(id, text.to_string(), label));
                tracing::debug!(%id, "Todo added");

                Self::save(state, env)
            },

            TodoAction::ToggleCompleted { id } => match state.todos.toggle_completed(id) {
                Some(_) => Self::save(state, env),
                None => SmallVec::new(),
            },

            TodoAction::BeginOrCommitEdit { id, new_text } => {
                match state.todos.begin_or_commit_edit(id, new_text.as_deref()) {
                    Some(_) => Self::save(state, env),
                    None => SmallVec::new(),
                }
            },

            TodoAction::DeleteTodo { id, confirmed: _ } => {
                let Some(item) = state.todos.remove(id) else {
                    return Self::reject(state, TodoError::NotFound(id));
                };
                if env.trash_enabled {
                    state.trash.soft_delete(item);
                }
                Self::save(state, env)
            },

            TodoAction::ClearTodos { confirmed: _ } => {
                if state.todos.is_empty() {
                    return Self::reject(state, TodoError::NothingToClear);
                }
                let cleared = state.todos.clear();
                tracing::debug!(cleared, "Todo list cleared");
                Self::save(state, env)
            },

            TodoAction::RestoreTodo { id } => {
                let Some(item) = state.trash.restore(id) else {
                    return Self::reject(state, TodoError::NotFound(id));
                };
                state.todos.push_front(item);
                Self::save(state, env)
            },

            TodoAction::PurgeTodo { id, confirmed: _ } => {
                if state.trash.purge(id).is_none() {
                    return Self::reject(state, TodoError::NotFound(id));
                }
                Self::save(state, env)
            },

            TodoAction::PersistFailed { error } => {
                state.persist_error = Some(error);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use crate::types::{Confirmed, TodoList, Trash};
    use todolist_testing::{ReducerTest, SequentialIds, assertions, test_clock};

    fn env() -> TodoEnvironment {
        TodoEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialIds::new()),
            Persistence::new(Arc::new(MemoryStorage::new())),
        )
        .with_label_offset(FixedOffset::east_opt(0).unwrap())
    }

    fn yes() -> Confirmed {
        Confirmed::obtain(&mut |_: &str| true, "sure?").unwrap()
    }

    fn state_with(texts: &[&str]) -> TodoState {
        let mut todos = TodoList::new();
        for (i, text) in texts.iter().enumerate() {
            todos.push_front(TodoItem::new(
                TodoId::new(100 + i64::try_from(i).unwrap()),
                (*text).to_string(),
                "00:00 1 januari 2025".to_string(),
            ));
        }
        TodoState::new(todos, Trash::new())
    }

    #[test]
    fn label_uses_swedish_month_names() {
        let at = DateTime::parse_from_rfc3339("2026-10-19T14:05:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let offset = FixedOffset::east_opt(2 * 3600);
        assert_eq!(created_at_label(at, offset), "16:05 19 oktober 2026");
    }

    #[test]
    fn add_inserts_at_head_and_saves() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(state_with(&["older"]))
            .when_action(TodoAction::AddTodo {
                text: "  Buy milk ".into(),
            })
            .then_state(|state| {
                let head = state.todos.iter().next().unwrap();
                assert_eq!(head.id, TodoId::new(1));
                assert_eq!(head.text, "Buy milk");
                assert!(!head.completed);
                assert_eq!(head.created_at, "00:00 1 januari 2025");
                assert_eq!(state.todos.len(), 2);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn add_blank_text_is_rejected() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::default())
            .when_action(TodoAction::AddTodo { text: "   ".into() })
            .then_state(|state| {
                assert!(state.todos.is_empty());
                assert_eq!(state.last_error, Some(TodoError::EmptyText));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn toggle_unknown_id_is_silent() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(state_with(&["a"]))
            .when_action(TodoAction::ToggleCompleted { id: TodoId::new(9) })
            .then_state(|state| {
                assert_eq!(state.last_error, None);
                assert!(!state.todos.iter().any(|t| t.completed));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn delete_moves_to_trash() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(state_with(&["a", "b"]))
            .when_action(TodoAction::DeleteTodo {
                id: TodoId::new(100),
                confirmed: yes(),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert!(state.todos.get(TodoId::new(100)).is_none());
                assert!(state.trash.get(TodoId::new(100)).is_some());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn delete_without_trash_is_permanent() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env().with_trash(false))
            .given_state(state_with(&["a"]))
            .when_action(TodoAction::DeleteTodo {
                id: TodoId::new(100),
                confirmed: yes(),
            })
            .then_state(|state| {
                assert!(state.todos.is_empty());
                assert!(state.trash.is_empty());
            })
            .run();
    }

    #[test]
    fn delete_unknown_id_reports_not_found() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(state_with(&["a"]))
            .when_action(TodoAction::DeleteTodo {
                id: TodoId::new(5),
                confirmed: yes(),
            })
            .then_state(|state| {
                assert_eq!(state.last_error, Some(TodoError::NotFound(TodoId::new(5))));
                assert_eq!(state.todos.len(), 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn clear_empty_list_reports_nothing_to_clear() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::default())
            .when_action(TodoAction::ClearTodos { confirmed: yes() })
            .then_state(|state| assert_eq!(state.last_error, Some(TodoError::NothingToClear)))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn restore_then_purge() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(state_with(&["a", "b"]))
            .when_action(TodoAction::DeleteTodo {
                id: TodoId::new(100),
                confirmed: yes(),
            })
            .when_action(TodoAction::DeleteTodo {
                id: TodoId::new(101),
                confirmed: yes(),
            })
            .when_action(TodoAction::RestoreTodo { id: TodoId::new(100) })
            .when_action(TodoAction::PurgeTodo {
                id: TodoId::new(101),
                confirmed: yes(),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert!(state.todos.get(TodoId::new(100)).is_some());
                assert!(state.trash.is_empty());
            })
            .run();
    }

    #[test]
    fn persist_failure_keeps_mutation() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::default())
            .when_action(TodoAction::AddTodo { text: "x".into() })
            .when_action(TodoAction::PersistFailed {
                error: "disk full".into(),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert_eq!(state.persist_error.as_deref(), Some("disk full"));
            })
            .run();
    }

    #[test]
    fn next_user_action_clears_errors() {
        ReducerTest::new(TodoReducer::new())
            .with_env(env())
            .given_state(TodoState::default())
            .when_action(TodoAction::AddTodo { text: String::new() })
            .when_action(TodoAction::AddTodo { text: "ok".into() })
            .then_state(|state| assert_eq!(state.last_error, None))
            .run();
    }
}
