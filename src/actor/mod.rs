//! Actor module: the input side of the pipeline.
//!
//! - [`InputActor`]: polls a [`KeySource`] on its own thread
//! - [`EventQueue`]: hands keys to the frame loop
//! - [`KeyEvent`]: the message type

mod input;
mod messages;
mod queue;

pub use input::{InputActor, KeySource, TerminalKeys};
pub use messages::{KeyCode, KeyEvent};
pub use queue::EventQueue;
