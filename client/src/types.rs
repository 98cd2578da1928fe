//! Domain types for the todo list.
//!
//! Two ordered collections hold every item: the active [`TodoList`] and the
//! [`Trash`] of soft-deleted items. Both insert at the head, so the newest
//! item is always shown first. An id lives in exactly one of them at a time.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a todo item
///
/// Derived from the creation time in milliseconds, see
/// [`todolist_core::environment::TimestampIds`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(i64);

impl TodoId {
    /// Wraps a raw id
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier
    pub id: TodoId,
    /// The task, never empty after trimming
    pub text: String,
    /// Whether the task is done
    pub completed: bool,
    /// Transient UI flag: the item is being edited. Not persisted.
    #[serde(skip)]
    pub editing: bool,
    /// Display label of the creation time, fixed at creation
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

impl TodoItem {
    /// Creates a new, not yet completed todo item
    #[must_use]
    pub const fn new(id: TodoId, text: String, created_at: String) -> Self {
        Self {
            id,
            text,
            completed: false,
            editing: false,
            created_at,
        }
    }
}

/// The active todo collection, newest first
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList(Vec<TodoItem>);

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Items in display order
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.0.iter()
    }

    /// Returns an item by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.0.iter().find(|todo| todo.id == id)
    }

    /// Inserts an item at the head
    pub fn push_front(&mut self, item: TodoItem) {
        self.0.insert(0, item);
    }

    /// Removes and returns the matching item
    pub fn remove(&mut self, id: TodoId) -> Option<TodoItem> {
        let index = self.0.iter().position(|todo| todo.id == id)?;
        Some(self.0.remove(index))
    }

    /// Flips `completed` on the matching item, returning the new value
    pub fn toggle_completed(&mut self, id: TodoId) -> Option<bool> {
        let todo = self.0.iter_mut().find(|todo| todo.id == id)?;
        todo.completed = !todo.completed;
        Some(todo.completed)
    }

    /// Starts editing the item, or commits the edit if it is already in progress
    ///
    /// Starting an edit stops every other edit, so at most one item is ever
    /// being edited. Committing with empty text keeps the current text.
    /// Returns the resulting `editing` flag, or `None` for an unknown id.
    pub fn begin_or_commit_edit(&mut self, id: TodoId, new_text: Option<&str>) -> Option<bool> {
        let index = self.0.iter().position(|todo| todo.id == id)?;

        if self.0[index].editing {
            let todo = &mut self.0[index];
            if let Some(text) = new_text.map(str::trim).filter(|text| !text.is_empty()) {
                todo.text = text.to_string();
            }
            todo.editing = false;
            return Some(false);
        }

        for (i, todo) in self.0.iter_mut().enumerate() {
            todo.editing = i == index;
        }
        Some(true)
    }

    /// Items whose text contains `term`, ignoring case, in display order
    ///
    /// An empty term matches everything. The returned iterator is cheap to
    /// clone, so the view can be walked more than once.
    pub fn search<'a>(
        &'a self,
        term: &str,
    ) -> impl Iterator<Item = &'a TodoItem> + Clone + use<'a> {
        let needle = term.to_lowercase();
        self.0
            .iter()
            .filter(move |todo| needle.is_empty() || todo.text.to_lowercase().contains(&needle))
    }

    /// Removes every item, returning how many there were
    pub fn clear(&mut self) -> usize {
        let count = self.0.len();
        self.0.clear();
        count
    }

    /// Largest id in the list
    #[must_use]
    pub fn max_id(&self) -> Option<TodoId> {
        self.0.iter().map(|todo| todo.id).max()
    }
}

impl From<Vec<TodoItem>> for TodoList {
    fn from(items: Vec<TodoItem>) -> Self {
        Self(items)
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Soft-deleted items waiting to be restored or purged, newest first
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trash(Vec<TodoItem>);

impl Trash {
    /// Creates an empty trash
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of trashed items
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the trash is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Trashed items, most recently deleted first
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.0.iter()
    }

    /// Returns a trashed item by id
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.0.iter().find(|todo| todo.id == id)
    }

    /// Puts an item at the head of the trash
    pub fn soft_delete(&mut self, mut item: TodoItem) {
        item.editing = false;
        self.0.insert(0, item);
    }

    /// Takes an item back out of the trash
    pub fn restore(&mut self, id: TodoId) -> Option<TodoItem> {
        let index = self.0.iter().position(|todo| todo.id == id)?;
        Some(self.0.remove(index))
    }

    /// Destroys an item for good
    pub fn purge(&mut self, id: TodoId) -> Option<TodoItem> {
        self.restore(id)
    }

    /// Largest id in the trash
    #[must_use]
    pub fn max_id(&self) -> Option<TodoId> {
        self.0.iter().map(|todo| todo.id).max()
    }
}

impl From<Vec<TodoItem>> for Trash {
    fn from(items: Vec<TodoItem>) -> Self {
        Self(items)
    }
}

/// Rejections of a user action. None of them change the collections.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// The text was empty after trimming
    #[error("Add a todo first")]
    EmptyText,

    /// No item with this id in the collection the action targets
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// Clear was requested on an empty list
    #[error("There are no todos to clear")]
    NothingToClear,
}

/// State owned by the store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Active items
    pub todos: TodoList,
    /// Soft-deleted items
    pub trash: Trash,
    /// Rejection of the last user action, if any
    pub last_error: Option<TodoError>,
    /// Failure of the last save; the in-memory change stands regardless
    pub persist_error: Option<String>,
}

impl TodoState {
    /// Creates a state from loaded collections
    #[must_use]
    pub const fn new(todos: TodoList, trash: Trash) -> Self {
        Self {
            todos,
            trash,
            last_error: None,
            persist_error: None,
        }
    }

    /// Largest id in either collection
    #[must_use]
    pub fn max_id(&self) -> Option<TodoId> {
        self.todos.max_id().max(self.trash.max_id())
    }
}

/// Proof that the user agreed to a destructive action
///
/// The only way to get one is [`Confirmed::obtain`], which asks through a
/// [`Confirm`](crate::view::Confirm) implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confirmed(());

impl Confirmed {
    /// Asks `confirm` with `prompt`; `None` when the user declined
    pub fn obtain<C>(confirm: &mut C, prompt: &str) -> Option<Self>
    where
        C: crate::view::Confirm + ?Sized,
    {
        confirm.confirm(prompt).then_some(Self(()))
    }
}

/// Inputs of the todo reducer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Add a todo at the head of the list
    AddTodo {
        /// Raw input, trimmed by the reducer
        text: String,
    },

    /// Flip the completed flag
    ToggleCompleted {
        /// Target item
        id: TodoId,
    },

    /// Start editing, or commit the running edit
    BeginOrCommitEdit {
        /// Target item
        id: TodoId,
        /// Replacement text when committing
        new_text: Option<String>,
    },

    /// Delete a todo (to the trash when it is enabled)
    DeleteTodo {
        /// Target item
        id: TodoId,
        /// The user agreed
        confirmed: Confirmed,
    },

    /// Empty the active list
    ClearTodos {
        /// The user agreed
        confirmed: Confirmed,
    },

    /// Move a trashed item back to the head of the list
    RestoreTodo {
        /// Target item
        id: TodoId,
    },

    /// Delete a trashed item for good
    PurgeTodo {
        /// Target item
        id: TodoId,
        /// The user agreed
        confirmed: Confirmed,
    },

    /// Feedback: saving the collections failed
    PersistFailed {
        /// Rendered persistence error
        error: String,
    },
}

impl TodoAction {
    /// Returns `true` for actions coming from the user rather than from effects
    #[must_use]
    pub const fn is_user_action(&self) -> bool {
        !matches!(self, Self::PersistFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, text: &str) -> TodoItem {
        TodoItem::new(TodoId::new(id), text.to_string(), "00:00 1 januari 2025".to_string())
    }

    fn list(items: &[(i64, &str)]) -> TodoList {
        TodoList::from(items.iter().map(|(id, text)| item(*id, text)).collect::<Vec<_>>())
    }

    #[test]
    fn push_front_puts_newest_first() {
        let mut todos = TodoList::new();
        todos.push_front(item(1, "first"));
        todos.push_front(item(2, "second"));
        let ids: Vec<_> = todos.iter().map(|t| t.id.get()).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn edit_start_stops_other_edits() {
        let mut todos = list(&[(1, "a"), (2, "b")]);
        assert_eq!(todos.begin_or_commit_edit(TodoId::new(1), None), Some(true));
        assert_eq!(todos.begin_or_commit_edit(TodoId::new(2), None), Some(true));
        let editing: Vec<_> = todos.iter().filter(|t| t.editing).map(|t| t.id.get()).collect();
        assert_eq!(editing, vec![2]);
    }

    #[test]
    fn commit_with_empty_text_keeps_old_text() {
        let mut todos = list(&[(1, "keep me")]);
        todos.begin_or_commit_edit(TodoId::new(1), None);
        assert_eq!(todos.begin_or_commit_edit(TodoId::new(1), Some("  ")), Some(false));
        assert_eq!(todos.get(TodoId::new(1)).map(|t| t.text.as_str()), Some("keep me"));
    }

    #[test]
    fn commit_replaces_text() {
        let mut todos = list(&[(1, "old")]);
        todos.begin_or_commit_edit(TodoId::new(1), None);
        todos.begin_or_commit_edit(TodoId::new(1), Some(" new "));
        let todo = todos.get(TodoId::new(1)).cloned().unwrap_or_else(|| item(0, ""));
        assert_eq!(todo.text, "new");
        assert!(!todo.editing);
    }

    #[test]
    fn search_ignores_case_and_keeps_order() {
        let todos = list(&[(3, "Buy MILK"), (2, "walk dog"), (1, "milkshake")]);
        let hits: Vec<_> = todos.search("milk").map(|t| t.id.get()).collect();
        assert_eq!(hits, vec![3, 1]);
        assert_eq!(todos.search("").count(), 3);
    }

    #[test]
    fn trash_restore_and_purge() {
        let mut trash = Trash::new();
        trash.soft_delete(item(1, "a"));
        trash.soft_delete(item(2, "b"));
        assert_eq!(trash.iter().next().map(|t| t.id.get()), Some(2));
        assert!(trash.restore(TodoId::new(1)).is_some());
        assert!(trash.purge(TodoId::new(2)).is_some());
        assert!(trash.is_empty());
        assert!(trash.purge(TodoId::new(2)).is_none());
    }

    #[test]
    fn editing_is_not_serialized() {
        let mut todo = item(5, "x");
        todo.editing = true;
        let json = serde_json::to_string(&todo).unwrap_or_default();
        assert_eq!(
            json,
            r#"{"id":5,"text":"x","completed":false,"createdAt":"00:00 1 januari 2025"}"#
        );
    }

    #[test]
    fn state_max_id_spans_both_collections() {
        let mut state = TodoState::new(list(&[(4, "a")]), Trash::new());
        state.trash.soft_delete(item(9, "b"));
        assert_eq!(state.max_id(), Some(TodoId::new(9)));
    }
}
