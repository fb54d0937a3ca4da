//! Editor module: the document and the state the modal engine acts on.
//!
//! - [`TextBuffer`]: line storage with file load/save
//! - [`EditorState`]: cursor, mode, status and running flag over a buffer

mod buffer;
mod state;

pub use buffer::{byte_offset, char_len, BufferError, TextBuffer};
pub use state::{EditorState, Mode, Position, StatusSeverity};
