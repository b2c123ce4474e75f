//! Command-line words turned into page actions.
//!
//! ```text
//! create <name> <age> <yes|no>
//! edit <id> <name> <age> <yes|no>
//! remove <id>
//! ```
//!
//! Several commands may follow each other. Field values are kept as typed;
//! the page's own form validation decides whether they are acceptable.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{command}: missing {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("{0:?} is not a resource id")]
    InvalidId(String),

    #[error("expected yes or no, got {0:?}")]
    InvalidFlag(String),
}

/// Values to type into a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fields {
    pub name: String,
    pub age: String,
    pub mammal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(Fields),
    Edit { id: u64, fields: Fields },
    Remove(u64),
}

struct Words<'a> {
    command: &'static str,
    iter: std::slice::Iter<'a, String>,
}

impl<'a> Words<'a> {
    fn next(&mut self, argument: &'static str) -> Result<&'a str, ScriptError> {
        self.iter
            .next()
            .map(String::as_str)
            .ok_or(ScriptError::MissingArgument {
                command: self.command,
                argument,
            })
    }

    fn id(&mut self) -> Result<u64, ScriptError> {
        let raw = self.next("id")?;
        raw.parse().map_err(|_| ScriptError::InvalidId(raw.to_string()))
    }

    fn fields(&mut self) -> Result<Fields, ScriptError> {
        let name = self.next("name")?.to_string();
        let age = self.next("age")?.to_string();
        let mammal = match self.next("mammal flag")? {
            "yes" | "y" | "true" => true,
            "no" | "n" | "false" => false,
            other => return Err(ScriptError::InvalidFlag(other.to_string())),
        };
        Ok(Fields { name, age, mammal })
    }
}

pub fn parse(args: &[String]) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    let mut iter = args.iter();
    while let Some(word) = iter.next() {
        let command = match word.as_str() {
            "create" => "create",
            "edit" => "edit",
            "remove" => "remove",
            other => return Err(ScriptError::UnknownCommand(other.to_string())),
        };
        let mut words = Words { command, iter };
        commands.push(match command {
            "create" => Command::Create(words.fields()?),
            "edit" => Command::Edit {
                id: words.id()?,
                fields: words.fields()?,
            },
            _ => Command::Remove(words.id()?),
        });
        iter = words.iter;
    }
    Ok(commands)
}
