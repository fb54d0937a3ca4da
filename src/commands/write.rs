use super::Command;
use crate::editor::{EditorState, StatusSeverity};
use std::path::PathBuf;

/// `:w [path]`: save the buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteCommand;

impl Command for WriteCommand {
    fn name(&self) -> &'static str {
        "write"
    }

    fn matches(&self, input: &str) -> bool {
        input.starts_with(":w")
    }

    fn execute(&self, state: &mut EditorState, input: &str) {
        let argument = input.get(2..).unwrap_or("").trim_start();
        let target = if argument.is_empty() {
            state.buffer().file_path().map(PathBuf::from)
        } else {
            Some(PathBuf::from(argument))
        };

        let Some(target) = target else {
            state.set_status("No file specified for write", StatusSeverity::Warning);
            return;
        };

        match state.buffer_mut().save_to_file(Some(&target)) {
            Ok(()) => {
                let lines = state.buffer().line_count();
                state.set_status(format!("Wrote {lines} lines"), StatusSeverity::Info);
            }
            Err(err) => {
                tracing::warn!(%err, "write failed");
                state.set_status("Failed to write file", StatusSeverity::Error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TextBuffer;
    use std::fs;

    #[test]
    fn test_write_to_argument_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut state = EditorState::new(TextBuffer::from_lines(["one", "two"]));
        state.buffer_mut().mark_dirty();

        let input = format!(":w   {}", path.display());
        assert!(WriteCommand.matches(&input));
        WriteCommand.execute(&mut state, &input);

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo");
        assert_eq!(state.status(), "Wrote 2 lines");
        assert_eq!(state.status_severity(), StatusSeverity::Info);
        assert!(!state.buffer().is_dirty());
        assert_eq!(state.buffer().file_path(), Some(path.as_path()));
    }

    #[test]
    fn test_write_defaults_to_buffer_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut buffer = TextBuffer::from_lines(["kept"]);
        buffer.set_file_path(file.path());
        let mut state = EditorState::new(buffer);

        WriteCommand.execute(&mut state, ":w");
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "kept");
        assert_eq!(state.status(), "Wrote 1 lines");
    }

    #[test]
    fn test_write_without_path() {
        let mut state = EditorState::default();
        WriteCommand.execute(&mut state, ":w");
        assert_eq!(state.status(), "No file specified for write");
        assert_eq!(state.status_severity(), StatusSeverity::Warning);
    }

    #[test]
    fn test_write_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = EditorState::default();
        let input = format!(":w {}", dir.path().join("missing/dir/file").display());
        WriteCommand.execute(&mut state, &input);
        assert_eq!(state.status(), "Failed to write file");
        assert_eq!(state.status_severity(), StatusSeverity::Error);
    }
}
