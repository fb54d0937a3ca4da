//! App: the frame loop tying input, engine and renderer together.
//!
//! The input actor fills the [`EventQueue`] on its own thread. Every tick
//! the frame loop drains the queue, applies the keys in order through the
//! [`ModeEngine`], renders once and sleeps off the rest of the tick.

use crate::actor::{EventQueue, InputActor, KeyEvent, KeySource, TerminalKeys};
use crate::config::EngineConfig;
use crate::editor::{EditorState, StatusSeverity, TextBuffer};
use crate::engine::ModeEngine;
use crate::registry::Registry;
use crate::render::{Renderer, Theme};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Character drawn before the command line.
pub const COMMAND_PREFIX: char = ':';

/// Build the initial editor state for an optional file argument.
///
/// A file that cannot be read still binds its path, so `:w` creates it.
pub fn open_buffer(path: Option<&Path>) -> EditorState {
    let Some(path) = path else {
        let mut state = EditorState::new(TextBuffer::new());
        state.set_status("New Buffer", StatusSeverity::Info);
        return state;
    };

    let mut buffer = TextBuffer::new();
    match buffer.load_from_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), lines = buffer.line_count(), "loaded file");
            let mut state = EditorState::new(buffer);
            state.set_status("Loaded file", StatusSeverity::Info);
            state
        }
        Err(err) => {
            tracing::warn!(%err, "starting with a new file");
            let mut buffer = TextBuffer::new();
            buffer.set_file_path(path);
            let mut state = EditorState::new(buffer);
            state.set_status("New file", StatusSeverity::Info);
            state
        }
    }
}

/// Raw mode (and optionally the alternate screen) for as long as it lives.
#[derive(Debug)]
pub struct TerminalGuard {
    alternate_screen: bool,
}

impl TerminalGuard {
    /// Put the terminal into editing mode.
    pub fn enter(alternate_screen: bool) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let guard = Self { alternate_screen };
        let mut stdout = io::stdout();
        if alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        execute!(stdout, terminal::Clear(terminal::ClearType::All), cursor::Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x1b[0m");
        let _ = execute!(stdout, cursor::Show);
        if self.alternate_screen {
            let _ = execute!(stdout, LeaveAlternateScreen);
        }
        let _ = terminal::disable_raw_mode();
    }
}

/// The running editor.
pub struct App {
    state: EditorState,
    engine: ModeEngine,
    queue: Arc<EventQueue>,
    config: EngineConfig,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mode", &self.state.mode())
            .field("cursor", &self.state.cursor())
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an app over `state`, registering the engine's core bindings
    /// in `registry`.
    pub fn new(state: EditorState, registry: Arc<Registry>, config: EngineConfig) -> Self {
        Self {
            state,
            engine: ModeEngine::new(registry),
            queue: Arc::new(EventQueue::new()),
            config,
        }
    }

    /// Editor state.
    pub const fn state(&self) -> &EditorState {
        &self.state
    }

    /// Modal engine.
    pub const fn engine(&self) -> &ModeEngine {
        &self.engine
    }

    /// Queue the input actor feeds.
    pub const fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Apply events in order, stopping once quit is requested.
    ///
    /// Returns how many events were applied.
    pub fn process_events<I>(&mut self, events: I) -> usize
    where
        I: IntoIterator<Item = KeyEvent>,
    {
        let mut applied = 0;
        for event in events {
            if !self.state.is_running() {
                break;
            }
            self.engine.handle_event(&mut self.state, event);
            applied += 1;
        }
        applied
    }

    /// Run until quit, reading keys from `source` and drawing with
    /// `renderer`.
    ///
    /// `query_size` is asked for the terminal size before each frame. The
    /// input thread has stopped by the time this returns, whether or not
    /// rendering failed.
    pub fn run<S, W, F>(
        &mut self,
        source: S,
        renderer: &mut Renderer<W>,
        query_size: F,
    ) -> io::Result<()>
    where
        S: KeySource + 'static,
        W: Write,
        F: FnMut() -> Option<(u16, u16)>,
    {
        tracing::info!(tick = ?self.config.tick(), "editor started");
        let input = InputActor::spawn(source, Arc::clone(&self.queue), self.config.input_backoff())?;
        let result = self.frame_loop(renderer, query_size);
        input.join();

        let stats = renderer.stats();
        tracing::info!(
            frames = stats.frames,
            bytes = stats.bytes_written,
            avg_us = stats.avg_render_us,
            "editor stopped"
        );
        result
    }

    /// Take over the process terminal and run until quit.
    pub fn run_in_terminal(&mut self, theme: Theme) -> io::Result<()> {
        let guard = TerminalGuard::enter(self.config.alternate_screen)?;
        let (width, height) = terminal::size()?;
        let mut renderer = Renderer::new(io::stdout(), width, height);
        renderer.set_theme(theme);

        let result = self.run(TerminalKeys::new(), &mut renderer, || terminal::size().ok());
        drop(guard);
        result
    }

    fn frame_loop<W, F>(&mut self, renderer: &mut Renderer<W>, mut query_size: F) -> io::Result<()>
    where
        W: Write,
        F: FnMut() -> Option<(u16, u16)>,
    {
        let tick = self.config.tick();
        renderer.render(&self.state, self.engine.command_line(), COMMAND_PREFIX)?;

        while self.state.is_running() {
            let frame_start = Instant::now();

            let events = self.queue.consume_all();
            if !events.is_empty() {
                self.process_events(events);
                if !self.state.is_running() {
                    break;
                }
            }

            if let Some((width, height)) = query_size() {
                renderer.resize(width, height);
            }
            renderer.render(&self.state, self.engine.command_line(), COMMAND_PREFIX)?;

            let elapsed = frame_start.elapsed();
            if elapsed < tick {
                thread::sleep(tick - elapsed);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::KeyCode;
    use crate::editor::Mode;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::fs;

    struct Script(VecDeque<KeyEvent>);

    impl KeySource for Script {
        fn poll(&mut self) -> io::Result<Option<KeyEvent>> {
            Ok(self.0.pop_front())
        }
    }

    fn keys(text: &str) -> Vec<KeyEvent> {
        KeyEvent::from_keys(text)
    }

    fn app(lines: &[&str]) -> App {
        let state = EditorState::new(TextBuffer::from_lines(lines.iter().copied()));
        let config = EngineConfig {
            tick_ms: 1,
            input_backoff_ms: 1,
            alternate_screen: false,
        };
        App::new(state, Arc::new(Registry::new()), config)
    }

    #[test]
    fn test_open_buffer_statuses() {
        let state = open_buffer(None);
        assert_eq!(state.status(), "New Buffer");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let state = open_buffer(Some(&path));
        assert_eq!(state.status(), "New file");
        assert_eq!(state.buffer().lines(), &[""]);
        assert_eq!(state.buffer().file_path(), Some(path.as_path()));

        fs::write(&path, "one\r\ntwo").unwrap();
        let state = open_buffer(Some(&path));
        assert_eq!(state.status(), "Loaded file");
        assert_eq!(state.buffer().lines(), &["one", "two"]);
        assert_eq!(state.status_severity(), StatusSeverity::Info);
    }

    #[test]
    fn test_process_events_stops_at_quit() {
        let mut app = app(&["a", "b"]);
        let mut events = keys(":q");
        events.push(KeyEvent::new(KeyCode::Enter));
        events.extend(keys("dd"));

        let applied = app.process_events(events);
        assert_eq!(applied, 3);
        assert!(!app.state().is_running());
        assert_eq!(app.state().buffer().line_count(), 2);
    }

    #[test]
    fn test_run_drives_engine_and_renderer() {
        let mut app = app(&[""]);
        let mut script = keys("ihi");
        script.push(KeyEvent::new(KeyCode::Esc));
        script.extend(keys(":q!"));
        script.push(KeyEvent::new(KeyCode::Enter));

        let mut renderer = Renderer::new(Vec::new(), 40, 6);
        app.run(Script(script.into()), &mut renderer, || None).unwrap();

        assert!(!app.state().is_running());
        assert_eq!(app.state().buffer().lines(), &["hi"]);
        assert_eq!(app.state().mode(), Mode::Normal);
        assert!(renderer.stats().frames >= 1);

        let mut parser = vt100::Parser::new(6, 40, 0);
        parser.process(renderer.writer());
        let first_row = parser.screen().rows(0, 40).next().unwrap();
        assert!(first_row.starts_with("> 1 "));
    }

    #[test]
    fn test_frame_loop_applies_resize() {
        let mut app = app(&["x"]);
        let queue = Arc::clone(app.queue());
        let mut renderer = Renderer::new(Vec::new(), 40, 6);
        let mut size_queries = 0;

        app.frame_loop(&mut renderer, || {
            size_queries += 1;
            let mut quit = keys(":q");
            quit.push(KeyEvent::new(KeyCode::Enter));
            for key in quit {
                queue.push(key);
            }
            Some((30, 5))
        })
        .unwrap();

        assert_eq!(size_queries, 1);
        assert_eq!(renderer.size(), (30, 5));
        assert_eq!(renderer.stats().frames, 2);
        assert!(!app.state().is_running());

        let mut parser = vt100::Parser::new(5, 30, 0);
        parser.process(renderer.writer());
        let rows: Vec<String> = parser.screen().rows(0, 30).collect();
        assert!(rows[0].starts_with("> 1 x"));
        assert_eq!(rows[1].trim_end(), "    ~");
    }
}
