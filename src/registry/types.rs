//! Descriptor, record and event types stored by the [`Registry`](super::Registry).

use crate::editor::{EditorState, Mode};
use bitflags::bitflags;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Kinds of resources the registry can track.
///
/// Only commands and keybindings are stored today; the other kinds exist so
/// handles and conflict records can name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegistryResourceKind {
    /// An executable command.
    Command,
    /// A key gesture bound to a command.
    Keybinding,
    /// A color theme.
    Theme,
    /// A filetype definition.
    Filetype,
    /// A plugin.
    Plugin,
    /// An editor option.
    Option,
}

/// Who registered something. Later variants outrank earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum OriginKind {
    /// Built into the editor.
    #[default]
    Core,
    /// Compiled-in extension.
    Native,
    /// Loaded plugin.
    Plugin,
    /// User configuration.
    User,
}

impl OriginKind {
    /// Precedence rank; higher wins.
    pub const fn rank(self) -> u8 {
        match self {
            Self::Core => 0,
            Self::Native => 1,
            Self::Plugin => 2,
            Self::User => 3,
        }
    }
}

/// Registering component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Origin {
    /// Trust level.
    pub kind: OriginKind,
    /// Component name, e.g. `core.mode`.
    pub name: String,
}

impl Origin {
    /// Create an origin.
    pub fn new(kind: OriginKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}", self.kind, self.name)
    }
}

/// How long a registration is meant to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RegistrationLifetime {
    /// For the life of the process.
    #[default]
    Static,
    /// Until the registering component goes away.
    Session,
}

/// Outcome of a registration or the kind of a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationStatus {
    /// Active entry.
    Applied,
    /// Stored on a shadow stack behind an active entry.
    Shadowed,
    /// Not stored, or removed.
    Rejected,
}

/// What an undo of the command would cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UndoScope {
    /// Not undoable.
    #[default]
    None,
    /// A single line.
    Line,
    /// The whole buffer.
    Buffer,
}

/// Declared type of a command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommandParameterKind {
    /// Free text.
    #[default]
    String,
    /// Whole number.
    Integer,
    /// Floating point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// List value.
    Array,
    /// Key/value value.
    Object,
}

bitflags! {
    /// Resources a command may touch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandCapabilities: u32 {
        /// Reads buffer text.
        const READ_BUFFER = 1 << 0;
        /// Modifies buffer text.
        const WRITE_BUFFER = 1 << 1;
        /// Touches the filesystem.
        const FILESYSTEM = 1 << 2;
        /// Opens network connections.
        const NETWORK = 1 << 3;
        /// Starts processes.
        const SPAWN_PROCESS = 1 << 4;
    }
}

/// A declared command parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandParameter {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub kind: CommandParameterKind,
    /// Whether callers must supply it.
    pub required: bool,
    /// Default when omitted.
    pub default_value: Option<String>,
}

/// Static description of a command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandDescriptor {
    /// Unique id, e.g. `core.normal.move_down`.
    pub id: String,
    /// Human readable label.
    pub label: String,
    /// One-line help.
    pub short_description: String,
    /// Link to documentation.
    pub doc_url: String,
    /// Modes the command is meaningful in.
    pub modes: Vec<Mode>,
    /// Declared parameters.
    pub parameters: Vec<CommandParameter>,
    /// Resources the command touches.
    pub capabilities: CommandCapabilities,
    /// Undo coverage.
    pub undo_scope: UndoScope,
}

impl CommandDescriptor {
    /// Create a descriptor with just an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Two descriptors are interchangeable when they agree on modes,
    /// parameters and undo scope.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.modes == other.modes
            && self.parameters == other.parameters
            && self.undo_scope == other.undo_scope
    }
}

/// A request to run a command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandInvocation {
    /// Target command id.
    pub command_id: String,
    /// Named arguments.
    pub arguments: BTreeMap<String, String>,
}

/// What a native handler gets to work with.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// The editor being driven.
    pub state: &'a mut EditorState,
    /// Repeat count typed before the key (1 when none).
    pub count: usize,
}

/// In-process command implementation.
pub type NativeHandler = Arc<dyn Fn(&mut CommandContext<'_>, &CommandInvocation) + Send + Sync>;

/// How a command is executed.
#[derive(Clone)]
pub enum CommandCallable {
    /// Runs in process.
    Native(NativeHandler),
    /// Runs out of process at the given endpoint.
    Rpc(String),
}

impl CommandCallable {
    /// Wrap a closure as a native callable.
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, &CommandInvocation) + Send + Sync + 'static,
    {
        Self::Native(Arc::new(f))
    }

    /// A callable is usable if it has a handler or a non-empty endpoint.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Native(_) => true,
            Self::Rpc(endpoint) => !endpoint.is_empty(),
        }
    }

    /// The in-process handler, if any.
    pub fn native_handler(&self) -> Option<&NativeHandler> {
        match self {
            Self::Native(handler) => Some(handler),
            Self::Rpc(_) => None,
        }
    }
}

impl fmt::Debug for CommandCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => f.write_str("Native(..)"),
            Self::Rpc(endpoint) => f.debug_tuple("Rpc").field(endpoint).finish(),
        }
    }
}

/// A command submitted for registration.
#[derive(Debug, Clone)]
pub struct CommandRegistration {
    /// Description.
    pub descriptor: CommandDescriptor,
    /// Implementation.
    pub callable: CommandCallable,
    /// Tie-breaker within the same origin rank; higher wins.
    pub priority: i32,
    /// Intended lifetime.
    pub lifetime: RegistrationLifetime,
}

/// A command as stored in the registry.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    /// Description.
    pub descriptor: CommandDescriptor,
    /// Implementation.
    pub callable: CommandCallable,
    /// Who registered it.
    pub origin: Origin,
    /// Priority within the origin rank.
    pub priority: i32,
    /// Intended lifetime.
    pub lifetime: RegistrationLifetime,
    /// Handle token.
    pub token: u64,
    /// Registration order.
    pub sequence: u64,
    /// Active or shadowed.
    pub status: RegistrationStatus,
}

/// Mode a keybinding applies in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum KeybindingMode {
    /// Normal mode.
    #[default]
    Normal,
    /// Insert mode.
    Insert,
    /// Command-line mode.
    Command,
    /// Visual mode.
    Visual,
    /// Fallback for every mode.
    Any,
}

impl From<Mode> for KeybindingMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Normal => Self::Normal,
            Mode::Insert => Self::Insert,
            Mode::CommandLine => Self::Command,
            Mode::Visual => Self::Visual,
        }
    }
}

/// Static description of a keybinding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeybindingDescriptor {
    /// Unique id.
    pub id: String,
    /// Command to run.
    pub command_id: String,
    /// Mode the gesture is active in.
    pub mode: KeybindingMode,
    /// Key gesture, e.g. `j` or `<Down>`.
    pub gesture: String,
    /// Optional condition expression.
    pub when_clause: String,
    /// Arguments passed to the command.
    pub arguments: BTreeMap<String, String>,
}

impl KeybindingDescriptor {
    /// Same binding apart from its id.
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.command_id == other.command_id
            && self.mode == other.mode
            && self.gesture == other.gesture
            && self.when_clause == other.when_clause
            && self.arguments == other.arguments
    }
}

/// A keybinding submitted for registration.
#[derive(Debug, Clone)]
pub struct KeybindingRegistration {
    /// Description.
    pub descriptor: KeybindingDescriptor,
    /// Tie-breaker within the same origin rank; higher wins.
    pub priority: i32,
    /// Intended lifetime.
    pub lifetime: RegistrationLifetime,
}

/// A keybinding as stored in the registry.
#[derive(Debug, Clone)]
pub struct KeybindingRecord {
    /// Description.
    pub descriptor: KeybindingDescriptor,
    /// Who registered it.
    pub origin: Origin,
    /// Priority within the origin rank.
    pub priority: i32,
    /// Intended lifetime.
    pub lifetime: RegistrationLifetime,
    /// Handle token.
    pub token: u64,
    /// Registration order.
    pub sequence: u64,
    /// Active or shadowed.
    pub status: RegistrationStatus,
}

/// Ticket for removing a registration later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationHandle {
    /// Resource kind.
    pub resource: RegistryResourceKind,
    /// Resource id.
    pub id: String,
    /// Unique token; zero means invalid.
    pub token: u64,
}

impl RegistrationHandle {
    /// A handle that refers to nothing.
    pub fn invalid(resource: RegistryResourceKind, id: impl Into<String>) -> Self {
        Self {
            resource,
            id: id.into(),
            token: 0,
        }
    }

    /// Whether the handle refers to a stored entry.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.token != 0
    }
}

/// A logged precedence decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    /// Resource kind.
    pub resource: RegistryResourceKind,
    /// Resource id.
    pub id: String,
    /// Origin that kept (or took) the active slot, if there was one.
    pub winner_origin: Option<Origin>,
    /// Origin that lost.
    pub loser_origin: Origin,
    /// Explanation.
    pub message: String,
}

/// Result of a registration attempt.
#[derive(Debug, Clone)]
pub struct RegistrationResult {
    /// What happened.
    pub status: RegistrationStatus,
    /// Handle for later unregistration (invalid when rejected).
    pub handle: RegistrationHandle,
    /// The conflict logged by this attempt, if any.
    pub conflict: Option<ConflictRecord>,
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEvent {
    /// Resource kind.
    pub resource: RegistryResourceKind,
    /// Resource id.
    pub id: String,
    /// Kind of change.
    pub status: RegistrationStatus,
}

/// Subscriber callback.
pub type Subscriber = Arc<dyn Fn(&RegistryEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_rank_order() {
        assert!(OriginKind::User.rank() > OriginKind::Plugin.rank());
        assert!(OriginKind::Plugin.rank() > OriginKind::Native.rank());
        assert!(OriginKind::Native.rank() > OriginKind::Core.rank());
    }

    #[test]
    fn test_callable_validity() {
        assert!(CommandCallable::native(|_, _| {}).is_valid());
        assert!(CommandCallable::Rpc("unix:///tmp/ext.sock".into()).is_valid());
        assert!(!CommandCallable::Rpc(String::new()).is_valid());
        assert!(CommandCallable::Rpc("x".into()).native_handler().is_none());
    }

    #[test]
    fn test_descriptor_compatibility_ignores_labels() {
        let mut a = CommandDescriptor::new("c1");
        a.modes = vec![Mode::Normal];
        let mut b = a.clone();
        b.label = "Other label".into();
        assert!(a.is_compatible_with(&b));
        b.undo_scope = UndoScope::Buffer;
        assert!(!a.is_compatible_with(&b));
    }

    #[test]
    fn test_keybinding_mode_from_mode() {
        assert_eq!(KeybindingMode::from(Mode::CommandLine), KeybindingMode::Command);
        assert_eq!(KeybindingMode::from(Mode::Normal), KeybindingMode::Normal);
    }

    #[test]
    fn test_handle_validity() {
        let handle = RegistrationHandle::invalid(RegistryResourceKind::Command, "x");
        assert!(!handle.is_valid());
    }
}
