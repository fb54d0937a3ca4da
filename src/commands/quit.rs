use super::Command;
use crate::editor::{EditorState, StatusSeverity};

/// `:q` and `:q!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuitCommand;

impl Command for QuitCommand {
    fn name(&self) -> &'static str {
        "quit"
    }

    fn matches(&self, input: &str) -> bool {
        matches!(input, ":q" | ":q!")
    }

    fn execute(&self, state: &mut EditorState, input: &str) {
        let force = input == ":q!";
        if state.buffer().is_dirty() && !force {
            state.set_status(
                "Unsaved changes. Use :q! to force quit.",
                StatusSeverity::Warning,
            );
            return;
        }
        state.clear_status();
        state.request_quit();
    }
}
