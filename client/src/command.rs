//! Commands of the terminal front end.

use crate::types::Filter;

/// Help text listing every command
pub const HELP: &str = "\
commands:
  add <title>       create a task
  done <n>          mark task n completed
  undo <n>          mark task n active
  rm <n>            delete task n
  clear             delete all completed tasks
  filter <name>     show all, active or completed tasks
  theme             toggle light/dark
  list              redraw the list
  help              show this help
  quit              exit";

/// A parsed input line
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create a task
    Add(String),
    /// Mark the n-th listed task completed (1-based)
    Done(usize),
    /// Mark the n-th listed task active (1-based)
    Undo(usize),
    /// Delete the n-th listed task (1-based)
    Remove(usize),
    /// Clear completed tasks
    Clear,
    /// Change filter
    Filter(Filter),
    /// Toggle theme
    Theme,
    /// Redraw
    List,
    /// Show help
    Help,
    /// Exit
    Quit,
}

impl Command {
    /// Parses one line of input
    ///
    /// # Errors
    ///
    /// Returns a message for unknown commands and missing or invalid
    /// arguments.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(name, rest)| (name, rest.trim()));

        match name.to_ascii_lowercase().as_str() {
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "done" | "d" => parse_index(rest).map(Self::Done),
            "undo" | "u" => parse_index(rest).map(Self::Undo),
            "rm" | "del" => parse_index(rest).map(Self::Remove),
            "clear" => Ok(Self::Clear),
            "filter" | "f" => rest.parse().map(Self::Filter),
            "theme" => Ok(Self::Theme),
            "list" | "ls" | "" => Ok(Self::List),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

fn parse_index(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("expected a task number, got '{arg}'")),
        Ok(n) => Ok(n),
    }
}
