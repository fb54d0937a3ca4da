//! # vedit
//!
//! A modal, vi-like terminal text editor with an extensible command and
//! keybinding registry.
//!
//! ## Core Concepts
//!
//! - **Modal engine**: vi grammar with counts, operators, find motions and
//!   a yank register, driven one key at a time
//! - **Registry**: commands and keybindings from core, plugins and the user,
//!   resolved by origin rank and priority with shadowing and promotion
//! - **Actor model**: a dedicated input thread feeds a fixed-tick frame loop
//!   through a swap-out event queue
//! - **Double-buffered rendering**: each frame is diffed against the last
//!   and written in one syscall
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vedit::{EditorState, KeyEvent, ModeEngine, Registry, TextBuffer};
//!
//! let mut state = EditorState::new(TextBuffer::from_lines(["hello world"]));
//! let mut engine = ModeEngine::new(Arc::new(Registry::new()));
//! for key in KeyEvent::from_keys("dw") {
//!     engine.handle_event(&mut state, key);
//! }
//! assert_eq!(state.buffer().lines(), &["world"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod app;
pub mod commands;
pub mod config;
pub mod editor;
pub mod engine;
pub mod registry;
pub mod render;

// Re-exports for convenience
pub use actor::{EventQueue, InputActor, KeyCode, KeyEvent, KeySource};
pub use app::App;
pub use commands::{Command, CommandLine};
pub use config::{Config, ConfigError};
pub use editor::{BufferError, EditorState, Mode, Position, StatusSeverity, TextBuffer};
pub use engine::ModeEngine;
pub use registry::{Origin, OriginKind, Registry};
pub use render::{Renderer, Theme};
