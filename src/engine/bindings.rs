//! Normal-mode commands the engine contributes to the registry.
//!
//! These go through the same precedence rules as any plugin or user
//! binding, so a stronger registration for `j` or `i` replaces them.

use super::edit;
use super::motion::{first_non_blank, line_end};
use crate::editor::{EditorState, Mode, StatusSeverity};
use crate::registry::{
    CommandCallable, CommandContext, CommandDescriptor, CommandInvocation, CommandRegistration,
    KeybindingDescriptor, KeybindingMode, KeybindingRegistration, Origin, OriginKind,
    RegistrationHandle, RegistrationLifetime, RegistrationStatus, Registry,
};

/// Origin name used for the engine's own registrations.
pub const CORE_ORIGIN: &str = "core.mode";

pub(crate) type Handler = fn(&mut CommandContext<'_>, &CommandInvocation);

struct CoreCommand {
    id: &'static str,
    label: &'static str,
    gestures: &'static [&'static str],
    handler: Handler,
}

const CORE_COMMANDS: &[CoreCommand] = &[
    CoreCommand {
        id: "core.normal.move_down",
        label: "Move Down",
        gestures: &["j", "<Down>"],
        handler: move_down,
    },
    CoreCommand {
        id: "core.normal.move_up",
        label: "Move Up",
        gestures: &["k", "<Up>"],
        handler: move_up,
    },
    CoreCommand {
        id: "core.normal.move_left",
        label: "Move Left",
        gestures: &["h", "<Left>"],
        handler: move_left,
    },
    CoreCommand {
        id: "core.normal.move_right",
        label: "Move Right",
        gestures: &["l", "<Right>"],
        handler: move_right,
    },
    CoreCommand {
        id: "core.normal.enter_insert",
        label: "Enter Insert Mode",
        gestures: &["i"],
        handler: enter_insert,
    },
    CoreCommand {
        id: "core.normal.append",
        label: "Append",
        gestures: &["a"],
        handler: append,
    },
    CoreCommand {
        id: "core.normal.append_line_end",
        label: "Append at Line End",
        gestures: &["A"],
        handler: append_line_end,
    },
    CoreCommand {
        id: "core.normal.insert_line_start",
        label: "Insert at Line Start",
        gestures: &["I"],
        handler: insert_line_start,
    },
    CoreCommand {
        id: "core.normal.insert_below",
        label: "Insert Below",
        gestures: &["o"],
        handler: insert_below,
    },
    CoreCommand {
        id: "core.normal.insert_above",
        label: "Insert Above",
        gestures: &["O"],
        handler: insert_above,
    },
];

/// Built-in handler for a single-character gesture, used when the
/// registry has nothing bound to the key.
pub(crate) fn fallback(key: char) -> Option<Handler> {
    let mut buf = [0; 4];
    let gesture: &str = key.encode_utf8(&mut buf);
    CORE_COMMANDS
        .iter()
        .find(|command| command.gestures.iter().any(|g| *g == gesture))
        .map(|command| command.handler)
}

/// Run a core handler outside the registry.
pub(crate) fn run(handler: Handler, state: &mut EditorState, count: usize) {
    let mut ctx = CommandContext { state, count };
    handler(&mut ctx, &CommandInvocation::default());
}

/// Count as a signed cursor delta.
pub(crate) fn signed(count: usize) -> isize {
    isize::try_from(count).unwrap_or(isize::MAX)
}

/// Binding id suffix: alphanumerics kept, everything else `_`.
pub fn sanitize_gesture(gesture: &str) -> String {
    if gesture.is_empty() {
        return "binding".to_string();
    }
    gesture
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Register every core command and its keybindings under the
/// `core.mode` origin.
///
/// # Returns
///
/// Handles for every registration that was stored, for unregistering
/// when the engine goes away.
pub fn register_core(registry: &Registry) -> Vec<RegistrationHandle> {
    let origin = Origin::new(OriginKind::Core, CORE_ORIGIN);
    let mut handles = Vec::new();

    for command in CORE_COMMANDS {
        let descriptor = CommandDescriptor {
            label: command.label.to_string(),
            short_description: command.label.to_string(),
            modes: vec![Mode::Normal],
            ..CommandDescriptor::new(command.id)
        };
        let result = registry.register_command(
            CommandRegistration {
                descriptor,
                callable: CommandCallable::native(command.handler),
                priority: 0,
                lifetime: RegistrationLifetime::Session,
            },
            origin.clone(),
        );
        if result.status == RegistrationStatus::Rejected {
            tracing::warn!(command = command.id, "core command rejected");
            continue;
        }
        handles.push(result.handle);

        for gesture in command.gestures {
            let descriptor = KeybindingDescriptor {
                id: format!("{}.binding.{}", command.id, sanitize_gesture(gesture)),
                command_id: command.id.to_string(),
                mode: KeybindingMode::Normal,
                gesture: (*gesture).to_string(),
                ..KeybindingDescriptor::default()
            };
            let result = registry.register_keybinding(
                KeybindingRegistration {
                    descriptor,
                    priority: 0,
                    lifetime: RegistrationLifetime::Session,
                },
                origin.clone(),
            );
            if result.handle.is_valid() {
                handles.push(result.handle);
            }
        }
    }

    tracing::debug!(handles = handles.len(), "registered core bindings");
    handles
}

fn move_down(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    ctx.state.move_cursor_line(signed(ctx.count));
    ctx.state.clear_status();
}

fn move_up(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    ctx.state.move_cursor_line(-signed(ctx.count));
    ctx.state.clear_status();
}

fn move_left(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    ctx.state.move_cursor_column(-signed(ctx.count));
    ctx.state.clear_status();
}

fn move_right(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    ctx.state.move_cursor_column(signed(ctx.count));
    ctx.state.clear_status();
}

fn start_insert(ctx: &mut CommandContext<'_>) {
    ctx.state.set_mode(Mode::Insert);
    ctx.state.set_status(Mode::Insert.label(), StatusSeverity::Info);
}

fn enter_insert(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    start_insert(ctx);
}

fn append(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    ctx.state.move_cursor_column(1);
    start_insert(ctx);
}

fn append_line_end(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    let end = line_end(ctx.state.buffer(), ctx.state.cursor().line);
    ctx.state.set_position(end);
    start_insert(ctx);
}

fn insert_line_start(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    let line = ctx.state.cursor().line;
    let column = first_non_blank(ctx.state.buffer(), line);
    ctx.state.set_cursor(line, column);
    start_insert(ctx);
}

fn insert_below(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    if let Err(err) = edit::open_line_below(ctx.state) {
        tracing::warn!(%err, "open line below failed");
    }
    start_insert(ctx);
}

fn insert_above(ctx: &mut CommandContext<'_>, _: &CommandInvocation) {
    if let Err(err) = edit::open_line_above(ctx.state) {
        tracing::warn!(%err, "open line above failed");
    }
    start_insert(ctx);
}
