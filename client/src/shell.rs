//! Line-oriented command shell over the controller.

use crate::controller::SyncController;
use crate::error::ClientError;
use crate::types::TodoId;
use crate::view::{Confirm, View};
use std::str::FromStr;
use thiserror::Error;

/// Usage text printed by `help`
pub const HELP: &str = "\
commands:
  add <text>          add a todo at the top
  toggle <id>         mark done / not done
  edit <id> [text]    start editing; run again (with new text) to save
  delete <id>         delete a todo (asks first)
  clear               delete every todo (asks first)
  search [term]       filter the list, no term shows all
  list                show the list
  trash               show the trash
  restore <id>        move a todo back from the trash
  purge <id>          delete a trashed todo forever (asks first)
  help                show this text
  quit                leave";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add <text>`
    Add(String),
    /// `toggle <id>`
    Toggle(TodoId),
    /// `edit <id> [text]`
    Edit(TodoId, Option<String>),
    /// `delete <id>`
    Delete(TodoId),
    /// `clear`
    Clear,
    /// `search [term]`
    Search(String),
    /// `list`
    List,
    /// `trash`
    Trash,
    /// `restore <id>`
    Restore(TodoId),
    /// `purge <id>`
    Purge(TodoId),
    /// `help`
    Help,
    /// `quit`
    Quit,
}

/// Input that is not a valid command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Empty line
    #[error("type a command, or 'help'")]
    Empty,

    /// First word is not a command
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    /// The command needs an argument
    #[error("'{0}' needs an id")]
    MissingId(&'static str),

    /// The id is not a number
    #[error("'{0}' is not a todo id")]
    BadId(String),
}

fn parse_id(command: &'static str, rest: &str) -> Result<TodoId, CommandError> {
    let word = rest.split_whitespace().next().ok_or(CommandError::MissingId(command))?;
    word.parse()
        .map_err(|_| CommandError::BadId(word.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "add" => Ok(Self::Add(rest.to_string())),
            "toggle" => parse_id("toggle", rest).map(Self::Toggle),
            "edit" => {
                let id = parse_id("edit", rest)?;
                let text = rest
                    .split_once(char::is_whitespace)
                    .map(|(_, text)| text.trim().to_string())
                    .filter(|text| !text.is_empty());
                Ok(Self::Edit(id, text))
            },
            "delete" | "rm" => parse_id("delete", rest).map(Self::Delete),
            "clear" => Ok(Self::Clear),
            "search" | "find" => Ok(Self::Search(rest.to_string())),
            "list" | "ls" => Ok(Self::List),
            "trash" => Ok(Self::Trash),
            "restore" => parse_id("restore", rest).map(Self::Restore),
            "purge" => parse_id("purge", rest).map(Self::Purge),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Whether the shell keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line
    Continue,
    /// Leave the shell
    Quit,
}

/// Runs one command against the controller
///
/// # Errors
///
/// Returns an error if the store is shut down or the view fails.
pub async fn execute<V, C>(
    controller: &mut SyncController<V>,
    command: Command,
    confirm: &mut C,
) -> Result<Flow, ClientError>
where
    V: View,
    C: Confirm + ?Sized,
{
    tracing::debug!(?command, "Executing command");
    match command {
        Command::Add(text) => controller.add(&text).await?,
        Command::Toggle(id) => controller.toggle(id).await?,
        Command::Edit(id, text) => controller.edit(id, text.as_deref()).await?,
        Command::Delete(id) => controller.delete(id, confirm).await?,
        Command::Clear => controller.clear(confirm).await?,
        Command::Search(term) => controller.search(&term).await?,
        Command::List => controller.show_list().await?,
        Command::Trash => controller.show_trash().await?,
        Command::Restore(id) => controller.restore(id).await?,
        Command::Purge(id) => controller.purge(id, confirm).await?,
        Command::Help => controller.notify(HELP)?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, CommandError> {
        line.parse()
    }

    #[test]
    fn parses_text_commands() {
        assert_eq!(parse("add  Buy milk "), Ok(Command::Add("Buy milk".into())));
        assert_eq!(parse("add"), Ok(Command::Add(String::new())));
        assert_eq!(parse("search"), Ok(Command::Search(String::new())));
        assert_eq!(parse("SEARCH Milk"), Ok(Command::Search("Milk".into())));
    }

    #[test]
    fn parses_id_commands() {
        assert_eq!(parse("toggle 42"), Ok(Command::Toggle(TodoId::new(42))));
        assert_eq!(parse("edit 7"), Ok(Command::Edit(TodoId::new(7), None)));
        assert_eq!(
            parse("edit 7 new words"),
            Ok(Command::Edit(TodoId::new(7), Some("new words".into())))
        );
        assert_eq!(parse("purge 3"), Ok(Command::Purge(TodoId::new(3))));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse("   "), Err(CommandError::Empty));
        assert_eq!(parse("toggle"), Err(CommandError::MissingId("toggle")));
        assert_eq!(parse("delete abc"), Err(CommandError::BadId("abc".into())));
        assert_eq!(parse("fly"), Err(CommandError::Unknown("fly".into())));
    }
}
