//! UI binding: what the controller draws and how it asks the user.

use crate::types::{TodoItem, TodoList, Trash};
use std::io::{self, Write};

/// Asks the user to agree to a destructive action
pub trait Confirm {
    /// Shows `prompt` and returns `true` if the user agreed
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Visible representation of a collection, rebuilt on every redraw
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListView {
    /// The collection has no items at all
    Empty,
    /// The collection has items but none match the filter
    NoMatch,
    /// Matching items in collection order
    Items(Vec<TodoItem>),
}

impl ListView {
    /// Derives the view of the active list under `filter`
    #[must_use]
    pub fn of_todos(todos: &TodoList, filter: &str) -> Self {
        if todos.is_empty() {
            return Self::Empty;
        }
        let items: Vec<_> = todos.search(filter).cloned().collect();
        if items.is_empty() {
            Self::NoMatch
        } else {
            Self::Items(items)
        }
    }

    /// Derives the view of the trash
    #[must_use]
    pub fn of_trash(trash: &Trash) -> Self {
        if trash.is_empty() {
            Self::Empty
        } else {
            Self::Items(trash.iter().cloned().collect())
        }
    }

    /// Items shown, empty for the sentinel variants
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        match self {
            Self::Items(items) => items,
            Self::Empty | Self::NoMatch => &[],
        }
    }
}

/// Rendering target of the controller
pub trait View {
    /// Draws the active list
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn render_list(&mut self, list: &ListView) -> io::Result<()>;

    /// Draws the trash
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn render_trash(&mut self, trash: &ListView) -> io::Result<()>;

    /// Shows a warning (rejected action, failed save)
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn warn(&mut self, message: &str) -> io::Result<()>;

    /// Shows an informational message
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn info(&mut self, message: &str) -> io::Result<()>;
}

/// Plain-text view over any writer
#[derive(Debug)]
pub struct TextView<W: Write> {
    out: W,
}

impl<W: Write> TextView<W> {
    /// Creates a view writing to `out`
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    /// Gives the writer back
    pub fn into_inner(self) -> W {
        self.out
    }

    fn row(&mut self, todo: &TodoItem) -> io::Result<()> {
        let mark = if todo.completed { 'x' } else { ' ' };
        let editing = if todo.editing { " (editing)" } else { "" };
        writeln!(
            self.out,
            "[{mark}] {:>13}  {}{editing}  {}",
            todo.id, todo.text, todo.created_at
        )
    }
}

impl<W: Write> View for TextView<W> {
    fn render_list(&mut self, list: &ListView) -> io::Result<()> {
        match list {
            ListView::Empty => writeln!(self.out, "The todo list is empty")?,
            ListView::NoMatch => writeln!(self.out, "No match")?,
            ListView::Items(items) => {
                for todo in items {
                    self.row(todo)?;
                }
            },
        }
        self.out.flush()
    }

    fn render_trash(&mut self, trash: &ListView) -> io::Result<()> {
        writeln!(self.out, "-- trash --")?;
        match trash {
            ListView::Empty | ListView::NoMatch => writeln!(self.out, "The trash is empty")?,
            ListView::Items(items) => {
                for todo in items {
                    self.row(todo)?;
                }
            },
        }
        self.out.flush()
    }

    fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "! {message}")?;
        self.out.flush()
    }

    fn info(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{message}")?;
        self.out.flush()
    }
}
