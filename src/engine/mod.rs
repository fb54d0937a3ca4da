//! Modal engine: turns key events into edits, motions and mode changes.
//!
//! # Dispatch
//!
//! Each event is routed by the editor's current mode:
//!
//! - **Normal**: escape, pending-operator arrows, counts, registry bindings,
//!   then the built-in vi grammar (see `normal.rs`)
//! - **Insert**: text entry, line split, backspace join, arrows
//! - **CommandLine**: edits the `:` line and runs it through [`CommandLine`]
//!
//! The engine contributes its own normal-mode commands to the shared
//! [`Registry`] on construction and removes them when dropped, so a
//! user or plugin registration with higher precedence overrides them.

mod bindings;
mod edit;
mod motion;
mod normal;
mod pending;
mod yank;

pub use bindings::{register_core, sanitize_gesture, CORE_ORIGIN};
pub use edit::{copy_char_range, copy_lines, delete_char_range, delete_lines};
pub use motion::{
    find_in_line, first_non_blank, is_blank_line, is_word_char, next_paragraph,
    next_word_start, previous_paragraph, previous_word_start, repeat_word_motion, word_end,
    word_motion, WordMotion,
};
pub use pending::{FindSpec, LastFind, Operator, PendingCommand, PendingInput, MAX_COUNT};
pub use yank::{PasteError, YankRegister};

use crate::actor::{KeyCode, KeyEvent};
use crate::commands::CommandLine;
use crate::editor::{EditorState, Mode, StatusSeverity};
use crate::registry::{
    CommandContext, CommandInvocation, RegistrationHandle, Registry,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// The modal state machine.
///
/// Owns the pending normal-mode input, the yank register and the `:` line.
/// Lives on the frame loop thread alongside the [`EditorState`] it drives.
pub struct ModeEngine {
    registry: Arc<Registry>,
    pending: PendingInput,
    register: YankRegister,
    command_line: String,
    commands: CommandLine,
    handles: Vec<RegistrationHandle>,
}

impl std::fmt::Debug for ModeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeEngine")
            .field("pending", &self.pending)
            .field("register", &self.register)
            .field("command_line", &self.command_line)
            .field("handles", &self.handles.len())
            .finish_non_exhaustive()
    }
}

impl ModeEngine {
    /// Create an engine with the built-in `:` commands and register the
    /// core normal-mode bindings.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_commands(registry, CommandLine::with_builtins())
    }

    /// Create an engine with a custom `:` command set.
    pub fn with_commands(registry: Arc<Registry>, commands: CommandLine) -> Self {
        let handles = register_core(&registry);
        Self {
            registry,
            pending: PendingInput::new(),
            register: YankRegister::new(),
            command_line: String::new(),
            commands,
            handles,
        }
    }

    /// The shared registry.
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Text typed after `:` so far.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Partially typed normal-mode command, e.g. `2d3`.
    pub fn pending_text(&self) -> String {
        self.pending.status_text()
    }

    /// Contents of the yank register.
    pub const fn register(&self) -> &YankRegister {
        &self.register
    }

    /// Apply one key event.
    pub fn handle_event(&mut self, state: &mut EditorState, event: KeyEvent) {
        match state.mode() {
            Mode::Normal => self.handle_normal(state, event),
            Mode::Insert => Self::handle_insert(state, event),
            Mode::CommandLine => self.handle_command_line(state, event),
            Mode::Visual => {
                if event.code == KeyCode::Esc {
                    state.set_mode(Mode::Normal);
                    state.clear_status();
                }
            }
        }
    }

    /// Run a registered command by id.
    ///
    /// Shadowed entries are considered when no active one exists. Reports
    /// "Command not found" or "Command not executable" on the status line.
    pub fn invoke_command(
        &self,
        state: &mut EditorState,
        command_id: &str,
        arguments: BTreeMap<String, String>,
        count: usize,
    ) -> bool {
        let Some(record) = self.registry.find_command(command_id, true) else {
            state.set_status("Command not found", StatusSeverity::Warning);
            return false;
        };
        let Some(handler) = record.callable.native_handler() else {
            state.set_status("Command not executable", StatusSeverity::Warning);
            return false;
        };

        let invocation = CommandInvocation {
            command_id: command_id.to_string(),
            arguments,
        };
        let mut ctx = CommandContext { state, count };
        handler(&mut ctx, &invocation);
        true
    }

    /// Resolve the event as a keybinding in the current mode (or `Any`)
    /// and run its command with the typed count.
    fn try_binding(&mut self, state: &mut EditorState, event: KeyEvent) -> bool {
        let gesture = event.gesture();
        let Some(binding) = self
            .registry
            .resolve_keybinding(state.mode().into(), &gesture)
        else {
            return false;
        };

        let count = self.pending.take_count(1);
        self.pending.clear();
        tracing::trace!(gesture = %gesture, command = %binding.descriptor.command_id, "binding");
        self.invoke_command(
            state,
            &binding.descriptor.command_id,
            binding.descriptor.arguments,
            count,
        );
        true
    }

    fn handle_insert(state: &mut EditorState, event: KeyEvent) {
        match event.code {
            KeyCode::Esc => {
                state.set_mode(Mode::Normal);
                state.clear_status();
                state.move_cursor_column(-1);
            }
            KeyCode::Enter => {
                if let Err(err) = edit::split_line(state) {
                    tracing::warn!(%err, "split line failed");
                    state.set_status("Insert failed", StatusSeverity::Error);
                }
            }
            KeyCode::Backspace => {
                if let Err(err) = edit::backspace(state) {
                    tracing::warn!(%err, "backspace failed");
                }
            }
            KeyCode::Left => state.move_cursor_column(-1),
            KeyCode::Right => state.move_cursor_column(1),
            KeyCode::Up => state.move_cursor_line(-1),
            KeyCode::Down => state.move_cursor_line(1),
            KeyCode::Char(c) if !c.is_control() => {
                if let Err(err) = edit::insert_char(state, c) {
                    tracing::warn!(%err, "insert failed");
                }
            }
            KeyCode::Char(_) => {}
        }
    }

    fn handle_command_line(&mut self, state: &mut EditorState, event: KeyEvent) {
        match event.code {
            KeyCode::Esc => {
                self.command_line.clear();
                state.set_mode(Mode::Normal);
                state.clear_status();
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.command_line);
                state.set_mode(Mode::Normal);
                if line.is_empty() {
                    state.set_status("Command line empty", StatusSeverity::Warning);
                } else if !self.commands.execute(state, &line) {
                    state.set_status("Unknown command", StatusSeverity::Warning);
                }
            }
            KeyCode::Backspace => {
                self.command_line.pop();
            }
            KeyCode::Char(c) if !c.is_control() => self.command_line.push(c),
            _ => {}
        }
    }
}

impl Drop for ModeEngine {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            self.registry.unregister(&handle);
        }
    }
}
