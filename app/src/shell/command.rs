//! Parsing of shell input lines.

use crate::types::TaskId;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with a line of input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// First word is not a command
    #[error("unknown command `{0}`, type `help` for a list")]
    UnknownCommand(String),

    /// A required argument is missing
    #[error("missing argument, usage: {0}")]
    MissingArgument(&'static str),

    /// Id is not a number
    #[error("`{0}` is not a task id")]
    InvalidId(String),

    /// Inline fields without a separator
    #[error("separate title and description with `|`")]
    MalformedFields,
}

/// Title and description typed inline as `title | description`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fields {
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
}

/// A parsed shell command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    /// Print the list
    List,
    /// Add a task, opening the dialog when no fields were given
    Add(Option<Fields>),
    /// Edit a task, opening the dialog when no fields were given
    Edit(TaskId, Option<Fields>),
    /// Toggle completion of a task
    Toggle(TaskId),
    /// Delete a task
    Delete(TaskId),
    /// Save the list to a new document
    Save,
    /// Load the list from a document
    Load(PathBuf),
    /// List previously saved documents
    Files,
    /// Print usage
    Help,
    /// Leave the shell
    Quit,
}

/// Usage text printed by `help`
pub const HELP: &str = "\
Commands:
  list                               show all tasks
  add [title | description]          add a task
  edit <id> [title | description]    change title and description
  toggle <id>                        mark a task done or not done
  delete <id>                        remove a task
  save                               write the list to a new file
  load <path>                        replace the list with a saved file
  files                              show saved files
  help                               show this text
  quit                               leave";

/// Parses one line of input; blank lines yield `None`
///
/// # Errors
///
/// Returns a [`CommandError`] for unknown commands, missing or malformed ids,
/// and inline fields without a `|` separator.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "add" | "new" => ShellCommand::Add(parse_fields(rest)?),
        "edit" => {
            let (id, rest) = split_id(rest, "edit")?;
            ShellCommand::Edit(id, parse_fields(rest)?)
        },
        "toggle" | "done" => ShellCommand::Toggle(split_id(rest, "toggle")?.0),
        "delete" | "rm" => ShellCommand::Delete(split_id(rest, "delete")?.0),
        "save" => ShellCommand::Save,
        "load" | "open" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("load <path>"));
            }
            ShellCommand::Load(PathBuf::from(rest))
        },
        "files" => ShellCommand::Files,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        _ => return Err(CommandError::UnknownCommand(word.to_string())),
    };
    Ok(Some(command))
}

fn split_id<'a>(rest: &'a str, usage: &'static str) -> Result<(TaskId, &'a str), CommandError> {
    let (raw, tail) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(raw, tail)| (raw, tail.trim()));
    if raw.is_empty() {
        return Err(CommandError::MissingArgument(usage));
    }
    let id = raw
        .parse()
        .map_err(|_| CommandError::InvalidId(raw.to_string()))?;
    Ok((id, tail))
}

fn parse_fields(rest: &str) -> Result<Option<Fields>, CommandError> {
    if rest.is_empty() {
        return Ok(None);
    }
    let (title, description) = rest.split_once('|').ok_or(CommandError::MalformedFields)?;
    Ok(Some(Fields {
        title: title.trim().to_string(),
        description: description.trim().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, description: &str) -> Option<Fields> {
        Some(Fields {
            title: title.to_string(),
            description: description.to_string(),
        })
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("list"), Ok(Some(ShellCommand::List)));
        assert_eq!(parse("SAVE"), Ok(Some(ShellCommand::Save)));
        assert_eq!(parse("files"), Ok(Some(ShellCommand::Files)));
        assert_eq!(parse("quit"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(parse("?"), Ok(Some(ShellCommand::Help)));
    }

    #[test]
    fn add_with_and_without_fields() {
        assert_eq!(parse("add"), Ok(Some(ShellCommand::Add(None))));
        assert_eq!(
            parse("add Buy milk | 2 litres"),
            Ok(Some(ShellCommand::Add(fields("Buy milk", "2 litres"))))
        );
        assert_eq!(parse("add Buy milk"), Err(CommandError::MalformedFields));
    }

    #[test]
    fn edit_takes_id_then_fields() {
        assert_eq!(
            parse("edit 3"),
            Ok(Some(ShellCommand::Edit(TaskId::new(3), None)))
        );
        assert_eq!(
            parse("edit 3 New | Text"),
            Ok(Some(ShellCommand::Edit(TaskId::new(3), fields("New", "Text"))))
        );
    }

    #[test]
    fn id_errors() {
        assert_eq!(
            parse("toggle"),
            Err(CommandError::MissingArgument("toggle"))
        );
        assert_eq!(
            parse("delete abc"),
            Err(CommandError::InvalidId("abc".to_string()))
        );
        assert_eq!(
            parse("toggle 4"),
            Ok(Some(ShellCommand::Toggle(TaskId::new(4))))
        );
    }

    #[test]
    fn load_keeps_path_with_spaces() {
        assert_eq!(
            parse("load /home/me/My Files/tasks.json"),
            Ok(Some(ShellCommand::Load(PathBuf::from(
                "/home/me/My Files/tasks.json"
            ))))
        );
        assert_eq!(
            parse("load"),
            Err(CommandError::MissingArgument("load <path>"))
        );
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            parse("frobnicate now"),
            Err(CommandError::UnknownCommand("frobnicate".to_string()))
        );
    }
}
