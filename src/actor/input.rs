//! Input Actor: Dedicated thread for polling terminal keys.
//!
//! The actor polls a [`KeySource`] without blocking, pushes every key it
//! gets into the shared [`EventQueue`], and backs off for a short interval
//! when nothing is pending. Shutdown is cooperative through an atomic flag.

use super::messages::{KeyCode, KeyEvent};
use super::queue::EventQueue;
use crossterm::event::{self, Event, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// A non-blocking source of key events.
pub trait KeySource: Send {
    /// Return the next key if one is available right now.
    fn poll(&mut self) -> io::Result<Option<KeyEvent>>;
}

/// Key source backed by the process terminal via crossterm.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    /// Create a terminal key source.
    pub const fn new() -> Self {
        Self
    }

    /// Convert a crossterm event to a key event.
    ///
    /// Only key presses are kept. Chords with Ctrl or Alt are dropped so
    /// that e.g. Ctrl-C never inserts a literal `c`.
    fn convert_event(event: Event) -> Option<KeyEvent> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        Self::convert_key_code(key.code).map(KeyEvent::new)
    }

    fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
        Some(match code {
            event::KeyCode::Char(c) => KeyCode::Char(c),
            event::KeyCode::Enter => KeyCode::Enter,
            event::KeyCode::Esc => KeyCode::Esc,
            event::KeyCode::Backspace => KeyCode::Backspace,
            event::KeyCode::Up => KeyCode::Up,
            event::KeyCode::Down => KeyCode::Down,
            event::KeyCode::Left => KeyCode::Left,
            event::KeyCode::Right => KeyCode::Right,
            _ => return None,
        })
    }
}

impl KeySource for TerminalKeys {
    fn poll(&mut self) -> io::Result<Option<KeyEvent>> {
        if event::poll(Duration::ZERO)? {
            Ok(Self::convert_event(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Input actor that feeds the event queue.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input thread.
    ///
    /// # Arguments
    ///
    /// * `source` - Where keys come from.
    /// * `queue` - Queue shared with the frame loop.
    /// * `backoff` - Sleep between polls when no key is available.
    pub fn spawn<S>(source: S, queue: Arc<EventQueue>, backoff: Duration) -> io::Result<Self>
    where
        S: KeySource + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("vedit-input".to_string())
            .spawn(move || {
                Self::run_loop(source, &queue, &shutdown_clone, backoff);
            })?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Signal the input thread to stop.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop the input thread and wait for it to exit.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("input thread panicked");
            }
        }
    }

    fn run_loop<S: KeySource>(
        mut source: S,
        queue: &EventQueue,
        shutdown: &AtomicBool,
        backoff: Duration,
    ) {
        tracing::debug!("input thread started");
        while !shutdown.load(Ordering::Relaxed) {
            match source.poll() {
                Ok(Some(key)) => queue.push(key),
                Ok(None) => thread::sleep(backoff),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read key");
                    thread::sleep(backoff);
                }
            }
        }
        tracing::debug!("input thread stopped");
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
