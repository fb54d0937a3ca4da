//! Ex-style commands entered after `:`.
//!
//! A [`CommandLine`] holds an ordered list of [`Command`]s. Each submitted
//! line is split into commands, and each command runs through the first
//! implementation whose [`Command::matches`] accepts it.

mod delete;
mod quit;
mod write;

pub use delete::DeleteCommand;
pub use quit::QuitCommand;
pub use write::WriteCommand;

use crate::editor::EditorState;

/// A command-line command.
pub trait Command: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether this command handles `input` (which includes the leading `:`).
    fn matches(&self, input: &str) -> bool;

    /// Run the command. Outcomes are reported through the status line.
    fn execute(&self, state: &mut EditorState, input: &str);
}

/// Ordered command set plus the line splitter.
pub struct CommandLine {
    commands: Vec<Box<dyn Command>>,
}

impl Default for CommandLine {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.commands.iter().map(|c| c.name()))
            .finish()
    }
}

impl CommandLine {
    /// No commands at all.
    pub const fn empty() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// `:w`, `:q` and `:d`.
    pub fn with_builtins() -> Self {
        let mut line = Self::empty();
        line.add(Box::new(WriteCommand));
        line.add(Box::new(QuitCommand));
        line.add(Box::new(DeleteCommand));
        line
    }

    /// Append a command. Earlier commands win when several match.
    pub fn add(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    /// Split a submitted line into individual commands.
    ///
    /// Segments are separated by `|` or `;` and trimmed; empty segments are
    /// dropped. `wq`, `qw` and `x` expand to `:w` then `:q`. Anything else
    /// gets a leading `:` if it lacks one.
    pub fn split(line: &str) -> Vec<String> {
        let mut out = Vec::new();
        for segment in line.split(['|', ';']) {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match segment {
                "wq" | "qw" | "x" => {
                    out.push(":w".to_string());
                    out.push(":q".to_string());
                }
                _ if segment.starts_with(':') => out.push(segment.to_string()),
                _ => out.push(format!(":{segment}")),
            }
        }
        out
    }

    /// Run one command through the first matching implementation.
    pub fn dispatch(&self, state: &mut EditorState, input: &str) -> bool {
        let Some(command) = self.commands.iter().find(|c| c.matches(input)) else {
            tracing::debug!(input, "no command matched");
            return false;
        };
        tracing::debug!(input, command = command.name(), "executing command");
        command.execute(state, input);
        true
    }

    /// Execute a full command line.
    ///
    /// Stops at the first command nothing matches, or as soon as a command
    /// requests quit.
    ///
    /// # Returns
    ///
    /// `false` if the line was empty or a command was not recognized.
    pub fn execute(&self, state: &mut EditorState, line: &str) -> bool {
        let commands = Self::split(line);
        if commands.is_empty() {
            return false;
        }
        for input in &commands {
            if !self.dispatch(state, input) {
                return false;
            }
            if !state.is_running() {
                break;
            }
        }
        true
    }
}
