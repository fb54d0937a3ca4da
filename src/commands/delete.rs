use super::Command;
use crate::editor::{EditorState, StatusSeverity};

/// `:d[N]`: delete line `N` (1-based), or the cursor line.
///
/// Every digit after `:d` is part of the number, wherever it appears, so
/// `:d1x2` addresses line 12.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteCommand;

enum LineArgument {
    Missing,
    Line(usize),
    Overflow,
}

fn parse_line_argument(input: &str) -> LineArgument {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return LineArgument::Missing;
    }
    match digits.parse::<usize>() {
        Ok(0) => LineArgument::Missing,
        Ok(n) => LineArgument::Line(n),
        Err(_) => LineArgument::Overflow,
    }
}

impl Command for DeleteCommand {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn matches(&self, input: &str) -> bool {
        input.starts_with(":d")
    }

    fn execute(&self, state: &mut EditorState, input: &str) {
        let target = match parse_line_argument(input.get(2..).unwrap_or("")) {
            LineArgument::Missing => state.cursor().line,
            LineArgument::Line(n) => n - 1,
            LineArgument::Overflow => usize::MAX,
        };

        if target >= state.buffer().line_count() {
            state.set_status("Line out of range", StatusSeverity::Warning);
            return;
        }
        if let Err(err) = state.buffer_mut().delete_line(target) {
            tracing::warn!(%err, "delete line failed");
            state.set_status("Line out of range", StatusSeverity::Warning);
            return;
        }
        state.clamp_cursor();
        state.set_status(format!("Deleted line {}", target + 1), StatusSeverity::Info);
    }
}
