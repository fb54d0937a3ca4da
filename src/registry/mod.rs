//! Registry: commands and keybindings contributed by components of differing
//! trust.
//!
//! Every id (for commands) or `(mode, gesture)` pair (for keybindings) has at
//! most one active entry. A competing registration either takes the slot,
//! lands on a shadow stack behind it, or is rejected, depending on origin
//! rank, then priority, then descriptor compatibility. Every such decision is
//! appended to a conflict log. Removing an active entry promotes the best
//! shadow.
//!
//! All state sits behind one mutex. Subscribers are cloned out of the lock
//! and called after it is released, so a callback may call back into the
//! registry.

mod types;

pub use types::{
    CommandCallable, CommandCapabilities, CommandContext, CommandDescriptor, CommandInvocation,
    CommandParameter, CommandParameterKind, CommandRecord, CommandRegistration, ConflictRecord,
    KeybindingDescriptor, KeybindingMode, KeybindingRecord, KeybindingRegistration, NativeHandler,
    Origin, OriginKind, RegistrationHandle, RegistrationLifetime, RegistrationResult,
    RegistrationStatus, RegistryEvent, RegistryResourceKind, Subscriber, UndoScope,
};

use parking_lot::Mutex;
use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Stored entry plus the bookkeeping used for precedence.
#[derive(Debug, Clone)]
struct Slot<R> {
    registration: R,
    origin: Origin,
    token: u64,
    sequence: u64,
}

trait Ranked {
    fn priority(&self) -> i32;
}

impl Ranked for CommandRegistration {
    fn priority(&self) -> i32 {
        self.priority
    }
}

impl Ranked for KeybindingRegistration {
    fn priority(&self) -> i32 {
        self.priority
    }
}

impl<R: Ranked> Slot<R> {
    fn precedence(&self) -> (u8, i32) {
        (self.origin.kind.rank(), self.registration.priority())
    }

    /// Sort key for promotion: rank, then priority, then earliest sequence.
    fn promotion_key(&self) -> (u8, i32, Reverse<u64>) {
        let (rank, priority) = self.precedence();
        (rank, priority, Reverse(self.sequence))
    }
}

impl Slot<CommandRegistration> {
    fn to_record(&self, status: RegistrationStatus) -> CommandRecord {
        CommandRecord {
            descriptor: self.registration.descriptor.clone(),
            callable: self.registration.callable.clone(),
            origin: self.origin.clone(),
            priority: self.registration.priority,
            lifetime: self.registration.lifetime,
            token: self.token,
            sequence: self.sequence,
            status,
        }
    }
}

impl Slot<KeybindingRegistration> {
    fn id(&self) -> &str {
        &self.registration.descriptor.id
    }

    fn to_record(&self, status: RegistrationStatus) -> KeybindingRecord {
        KeybindingRecord {
            descriptor: self.registration.descriptor.clone(),
            origin: self.origin.clone(),
            priority: self.registration.priority,
            lifetime: self.registration.lifetime,
            token: self.token,
            sequence: self.sequence,
            status,
        }
    }
}

/// How an incoming registration relates to the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Replace,
    ShadowIncoming,
    Duplicate,
    Reject,
}

fn resolve(existing: (u8, i32), incoming: (u8, i32), compatible: bool) -> Resolution {
    match incoming.cmp(&existing) {
        Ordering::Greater => Resolution::Replace,
        Ordering::Less => Resolution::ShadowIncoming,
        Ordering::Equal if compatible => Resolution::Duplicate,
        Ordering::Equal => Resolution::Reject,
    }
}

/// Remove and return the best entry of a shadow stack.
fn take_best<R: Ranked>(stack: &mut Vec<Slot<R>>) -> Option<Slot<R>> {
    let index = stack
        .iter()
        .enumerate()
        .max_by_key(|(_, slot)| slot.promotion_key())
        .map(|(i, _)| i)?;
    Some(stack.remove(index))
}

type BindingKey = (KeybindingMode, String);

struct Inner {
    commands: HashMap<String, Slot<CommandRegistration>>,
    command_shadow: HashMap<String, Vec<Slot<CommandRegistration>>>,
    keybindings: HashMap<BindingKey, Slot<KeybindingRegistration>>,
    keybinding_shadow: HashMap<BindingKey, Vec<Slot<KeybindingRegistration>>>,
    keybinding_keys: HashMap<u64, BindingKey>,
    conflicts: Vec<ConflictRecord>,
    subscribers: BTreeMap<u64, Subscriber>,
    version: u64,
    next_token: u64,
    next_sequence: u64,
    next_subscription: u64,
}

impl Inner {
    fn new() -> Self {
        Self {
            commands: HashMap::new(),
            command_shadow: HashMap::new(),
            keybindings: HashMap::new(),
            keybinding_shadow: HashMap::new(),
            keybinding_keys: HashMap::new(),
            conflicts: Vec::new(),
            subscribers: BTreeMap::new(),
            version: 1,
            next_token: 1,
            next_sequence: 1,
            next_subscription: 1,
        }
    }

    fn allocate(&mut self) -> (u64, u64) {
        let token = self.next_token;
        let sequence = self.next_sequence;
        self.next_token += 1;
        self.next_sequence += 1;
        (token, sequence)
    }

    fn log_conflict(&mut self, conflict: &ConflictRecord, status: RegistrationStatus) {
        if status == RegistrationStatus::Rejected {
            tracing::warn!(
                resource = ?conflict.resource,
                id = %conflict.id,
                loser = %conflict.loser_origin,
                "{}",
                conflict.message
            );
        } else {
            tracing::debug!(
                resource = ?conflict.resource,
                id = %conflict.id,
                loser = %conflict.loser_origin,
                "{}",
                conflict.message
            );
        }
        self.conflicts.push(conflict.clone());
    }

    fn reject(
        &mut self,
        resource: RegistryResourceKind,
        id: &str,
        winner: Option<Origin>,
        loser: Origin,
        message: &str,
    ) -> RegistrationResult {
        let conflict = ConflictRecord {
            resource,
            id: id.to_string(),
            winner_origin: winner,
            loser_origin: loser,
            message: message.to_string(),
        };
        self.log_conflict(&conflict, RegistrationStatus::Rejected);
        RegistrationResult {
            status: RegistrationStatus::Rejected,
            handle: RegistrationHandle::invalid(resource, id),
            conflict: Some(conflict),
        }
    }

    fn keybinding_origin_by_id(&self, id: &str) -> Option<Origin> {
        self.keybindings
            .values()
            .chain(self.keybinding_shadow.values().flatten())
            .find(|slot| slot.id() == id)
            .map(|slot| slot.origin.clone())
    }
}

/// Versioned store of commands and keybindings.
pub struct Registry {
    inner: Mutex<Inner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Registry")
            .field("version", &inner.version)
            .field("commands", &inner.commands.len())
            .field("keybindings", &inner.keybindings.len())
            .field("conflicts", &inner.conflicts.len())
            .field("subscribers", &inner.subscribers.len())
            .finish_non_exhaustive()
    }
}

/// Outcome plus the events to deliver once the lock is released.
type Pending = (RegistrationResult, Vec<RegistryEvent>);

impl Registry {
    /// Create an empty registry at version 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Register a command.
    ///
    /// # Returns
    ///
    /// `Applied` if it took the active slot, `Shadowed` if stored behind a
    /// stronger entry, `Rejected` if not stored. Any precedence decision is
    /// also returned as the result's `conflict`.
    pub fn register_command(
        &self,
        registration: CommandRegistration,
        origin: Origin,
    ) -> RegistrationResult {
        let (result, events) = {
            let mut inner = self.inner.lock();
            Self::register_command_locked(&mut inner, registration, origin)
        };
        self.notify(&events);
        result
    }

    fn register_command_locked(
        inner: &mut Inner,
        registration: CommandRegistration,
        origin: Origin,
    ) -> Pending {
        const RESOURCE: RegistryResourceKind = RegistryResourceKind::Command;
        let id = registration.descriptor.id.clone();

        if id.is_empty() {
            let result = inner.reject(RESOURCE, &id, None, origin, "Command id must not be empty");
            return (result, Vec::new());
        }
        if !registration.callable.is_valid() {
            let result = inner.reject(
                RESOURCE,
                &id,
                None,
                origin,
                "Command callable must provide native callback or RPC endpoint",
            );
            return (result, Vec::new());
        }

        let Some(existing) = inner.commands.get(&id) else {
            let (token, sequence) = inner.allocate();
            inner.commands.insert(
                id.clone(),
                Slot {
                    registration,
                    origin,
                    token,
                    sequence,
                },
            );
            inner.version += 1;
            tracing::debug!(id = %id, token, "command registered");
            return applied(RESOURCE, id, token);
        };

        let resolution = resolve(
            existing.precedence(),
            (origin.kind.rank(), registration.priority),
            existing
                .registration
                .descriptor
                .is_compatible_with(&registration.descriptor),
        );
        let existing_origin = existing.origin.clone();

        if resolution == Resolution::Reject {
            let result = inner.reject(
                RESOURCE,
                &id,
                Some(existing_origin),
                origin,
                "Command signature conflict with identical precedence and priority",
            );
            return (result, Vec::new());
        }

        let (token, sequence) = inner.allocate();
        let incoming = Slot {
            registration,
            origin: origin.clone(),
            token,
            sequence,
        };

        let (status, winner, loser, message, events) = if resolution == Resolution::Replace {
            let previous = inner.commands.insert(id.clone(), incoming);
            if let Some(previous) = previous {
                inner.command_shadow.entry(id.clone()).or_default().push(previous);
            }
            (
                RegistrationStatus::Applied,
                origin,
                existing_origin,
                "Replaced command due to higher precedence or priority",
                vec![
                    event(RESOURCE, &id, RegistrationStatus::Shadowed),
                    event(RESOURCE, &id, RegistrationStatus::Applied),
                ],
            )
        } else {
            inner.command_shadow.entry(id.clone()).or_default().push(incoming);
            let message = if resolution == Resolution::Duplicate {
                "Duplicate command ignored (same precedence and priority)"
            } else {
                "Command shadowed by higher precedence or priority"
            };
            (
                RegistrationStatus::Shadowed,
                existing_origin,
                origin,
                message,
                vec![event(RESOURCE, &id, RegistrationStatus::Shadowed)],
            )
        };

        inner.version += 1;
        let conflict = ConflictRecord {
            resource: RESOURCE,
            id: id.clone(),
            winner_origin: Some(winner),
            loser_origin: loser,
            message: message.to_string(),
        };
        inner.log_conflict(&conflict, status);

        let result = RegistrationResult {
            status,
            handle: RegistrationHandle {
                resource: RESOURCE,
                id,
                token,
            },
            conflict: Some(conflict),
        };
        (result, events)
    }

    /// Register a keybinding. Same precedence rules as commands, keyed by
    /// `(mode, gesture)`.
    pub fn register_keybinding(
        &self,
        registration: KeybindingRegistration,
        origin: Origin,
    ) -> RegistrationResult {
        let (result, events) = {
            let mut inner = self.inner.lock();
            Self::register_keybinding_locked(&mut inner, registration, origin)
        };
        self.notify(&events);
        result
    }

    fn register_keybinding_locked(
        inner: &mut Inner,
        registration: KeybindingRegistration,
        origin: Origin,
    ) -> Pending {
        const RESOURCE: RegistryResourceKind = RegistryResourceKind::Keybinding;
        let id = registration.descriptor.id.clone();

        if id.is_empty() {
            let result = inner.reject(RESOURCE, &id, None, origin, "Keybinding id must not be empty");
            return (result, Vec::new());
        }
        if registration.descriptor.gesture.is_empty() {
            let result = inner.reject(
                RESOURCE,
                &id,
                None,
                origin,
                "Keybinding gesture must not be empty",
            );
            return (result, Vec::new());
        }
        if let Some(holder) = inner.keybinding_origin_by_id(&id) {
            let result = inner.reject(
                RESOURCE,
                &id,
                Some(holder),
                origin,
                "Keybinding id already registered",
            );
            return (result, Vec::new());
        }

        let key: BindingKey = (
            registration.descriptor.mode,
            registration.descriptor.gesture.clone(),
        );

        let Some(existing) = inner.keybindings.get(&key) else {
            let (token, sequence) = inner.allocate();
            inner.keybinding_keys.insert(token, key.clone());
            inner.keybindings.insert(
                key,
                Slot {
                    registration,
                    origin,
                    token,
                    sequence,
                },
            );
            inner.version += 1;
            tracing::debug!(id = %id, token, "keybinding registered");
            return applied(RESOURCE, id, token);
        };

        let resolution = resolve(
            existing.precedence(),
            (origin.kind.rank(), registration.priority),
            existing
                .registration
                .descriptor
                .is_compatible_with(&registration.descriptor),
        );
        let existing_origin = existing.origin.clone();
        let existing_id = existing.id().to_string();

        if resolution == Resolution::Reject {
            let result = inner.reject(
                RESOURCE,
                &id,
                Some(existing_origin),
                origin,
                "Conflicting keybinding with identical precedence and priority",
            );
            return (result, Vec::new());
        }

        let (token, sequence) = inner.allocate();
        inner.keybinding_keys.insert(token, key.clone());
        let incoming = Slot {
            registration,
            origin: origin.clone(),
            token,
            sequence,
        };

        let (status, winner, loser, message, events) = if resolution == Resolution::Replace {
            let previous = inner.keybindings.insert(key.clone(), incoming);
            if let Some(previous) = previous {
                inner.keybinding_shadow.entry(key).or_default().push(previous);
            }
            (
                RegistrationStatus::Applied,
                origin,
                existing_origin,
                "Replaced keybinding due to higher precedence or priority",
                vec![
                    event(RESOURCE, &existing_id, RegistrationStatus::Shadowed),
                    event(RESOURCE, &id, RegistrationStatus::Applied),
                ],
            )
        } else {
            inner.keybinding_shadow.entry(key).or_default().push(incoming);
            let message = if resolution == Resolution::Duplicate {
                "Duplicate keybinding ignored (same precedence and priority)"
            } else {
                "Keybinding shadowed by higher precedence or priority"
            };
            (
                RegistrationStatus::Shadowed,
                existing_origin,
                origin,
                message,
                vec![event(RESOURCE, &id, RegistrationStatus::Shadowed)],
            )
        };

        inner.version += 1;
        let conflict = ConflictRecord {
            resource: RESOURCE,
            id: id.clone(),
            winner_origin: Some(winner),
            loser_origin: loser,
            message: message.to_string(),
        };
        inner.log_conflict(&conflict, status);

        let result = RegistrationResult {
            status,
            handle: RegistrationHandle {
                resource: RESOURCE,
                id,
                token,
            },
            conflict: Some(conflict),
        };
        (result, events)
    }

    /// Remove a registration.
    ///
    /// Removing an active entry promotes the best shadow (highest rank, then
    /// highest priority, then earliest registration) and notifies
    /// subscribers with `Rejected`. Returns `false` for invalid or unknown
    /// handles, so repeated calls are harmless.
    pub fn unregister(&self, handle: &RegistrationHandle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        let (removed, events) = {
            let mut inner = self.inner.lock();
            match handle.resource {
                RegistryResourceKind::Command => Self::unregister_command(&mut inner, handle),
                RegistryResourceKind::Keybinding => Self::unregister_keybinding(&mut inner, handle),
                _ => (false, Vec::new()),
            }
        };
        self.notify(&events);
        removed
    }

    fn unregister_command(inner: &mut Inner, handle: &RegistrationHandle) -> (bool, Vec<RegistryEvent>) {
        let id = &handle.id;
        let is_active = inner
            .commands
            .get(id)
            .is_some_and(|slot| slot.token == handle.token);

        if is_active {
            inner.commands.remove(id);
            if let Some(stack) = inner.command_shadow.get_mut(id) {
                if let Some(promoted) = take_best(stack) {
                    tracing::debug!(id = %id, origin = %promoted.origin, "promoted shadowed command");
                    inner.commands.insert(id.clone(), promoted);
                }
                if stack.is_empty() {
                    inner.command_shadow.remove(id);
                }
            }
            inner.version += 1;
            return (
                true,
                vec![event(RegistryResourceKind::Command, id, RegistrationStatus::Rejected)],
            );
        }

        let Some(stack) = inner.command_shadow.get_mut(id) else {
            return (false, Vec::new());
        };
        let Some(index) = stack.iter().position(|slot| slot.token == handle.token) else {
            return (false, Vec::new());
        };
        stack.remove(index);
        if stack.is_empty() {
            inner.command_shadow.remove(id);
        }
        inner.version += 1;
        (true, Vec::new())
    }

    fn unregister_keybinding(
        inner: &mut Inner,
        handle: &RegistrationHandle,
    ) -> (bool, Vec<RegistryEvent>) {
        let Some(key) = inner.keybinding_keys.get(&handle.token).cloned() else {
            return (false, Vec::new());
        };

        let is_active = inner
            .keybindings
            .get(&key)
            .is_some_and(|slot| slot.token == handle.token && slot.id() == handle.id);

        if is_active {
            inner.keybindings.remove(&key);
            inner.keybinding_keys.remove(&handle.token);
            if let Some(stack) = inner.keybinding_shadow.get_mut(&key) {
                if let Some(promoted) = take_best(stack) {
                    tracing::debug!(id = %promoted.id(), origin = %promoted.origin, "promoted shadowed keybinding");
                    inner.keybindings.insert(key.clone(), promoted);
                }
                if stack.is_empty() {
                    inner.keybinding_shadow.remove(&key);
                }
            }
            inner.version += 1;
            return (
                true,
                vec![event(
                    RegistryResourceKind::Keybinding,
                    &handle.id,
                    RegistrationStatus::Rejected,
                )],
            );
        }

        let Some(stack) = inner.keybinding_shadow.get_mut(&key) else {
            return (false, Vec::new());
        };
        let Some(index) = stack
            .iter()
            .position(|slot| slot.token == handle.token && slot.id() == handle.id)
        else {
            return (false, Vec::new());
        };
        stack.remove(index);
        if stack.is_empty() {
            inner.keybinding_shadow.remove(&key);
        }
        inner.keybinding_keys.remove(&handle.token);
        inner.version += 1;
        (true, Vec::new())
    }

    /// Look up a command by id.
    ///
    /// With `include_shadow`, falls back to the most recently shadowed entry
    /// when no active one exists.
    pub fn find_command(&self, id: &str, include_shadow: bool) -> Option<CommandRecord> {
        let inner = self.inner.lock();
        if let Some(slot) = inner.commands.get(id) {
            return Some(slot.to_record(RegistrationStatus::Applied));
        }
        if !include_shadow {
            return None;
        }
        inner
            .command_shadow
            .get(id)
            .and_then(|stack| stack.last())
            .map(|slot| slot.to_record(RegistrationStatus::Shadowed))
    }

    /// Look up a keybinding by id.
    pub fn find_keybinding(&self, id: &str, include_shadow: bool) -> Option<KeybindingRecord> {
        let inner = self.inner.lock();
        if let Some(slot) = inner.keybindings.values().find(|slot| slot.id() == id) {
            return Some(slot.to_record(RegistrationStatus::Applied));
        }
        if !include_shadow {
            return None;
        }
        inner
            .keybinding_shadow
            .values()
            .flat_map(|stack| stack.iter().rev())
            .find(|slot| slot.id() == id)
            .map(|slot| slot.to_record(RegistrationStatus::Shadowed))
    }

    /// Find the active binding for a gesture, trying `mode` first and then
    /// [`KeybindingMode::Any`].
    pub fn resolve_keybinding(&self, mode: KeybindingMode, gesture: &str) -> Option<KeybindingRecord> {
        let inner = self.inner.lock();
        let lookup = |m: KeybindingMode| {
            inner
                .keybindings
                .get(&(m, gesture.to_string()))
                .map(|slot| slot.to_record(RegistrationStatus::Applied))
        };
        lookup(mode).or_else(|| {
            if mode == KeybindingMode::Any {
                None
            } else {
                lookup(KeybindingMode::Any)
            }
        })
    }

    /// Active commands, sorted by id.
    pub fn list_commands(&self) -> Vec<CommandRecord> {
        let inner = self.inner.lock();
        let mut records: Vec<_> = inner
            .commands
            .values()
            .map(|slot| slot.to_record(RegistrationStatus::Applied))
            .collect();
        records.sort_by(|a, b| a.descriptor.id.cmp(&b.descriptor.id));
        records
    }

    /// Active keybindings, sorted by id.
    pub fn list_keybindings(&self) -> Vec<KeybindingRecord> {
        let inner = self.inner.lock();
        let mut records: Vec<_> = inner
            .keybindings
            .values()
            .map(|slot| slot.to_record(RegistrationStatus::Applied))
            .collect();
        records.sort_by(|a, b| a.descriptor.id.cmp(&b.descriptor.id));
        records
    }

    /// Every conflict logged so far, oldest first.
    pub fn list_conflicts(&self) -> Vec<ConflictRecord> {
        self.inner.lock().conflicts.clone()
    }

    /// Monotonic change counter.
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Register a change callback. Returns its subscription token.
    pub fn subscribe<F>(&self, callback: F) -> u64
    where
        F: Fn(&RegistryEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let token = inner.next_subscription;
        inner.next_subscription += 1;
        inner.subscribers.insert(token, Arc::new(callback));
        token
    }

    /// Remove a change callback. Token 0 is never valid.
    pub fn unsubscribe(&self, token: u64) -> bool {
        if token == 0 {
            return false;
        }
        self.inner.lock().subscribers.remove(&token).is_some()
    }

    fn notify(&self, events: &[RegistryEvent]) {
        if events.is_empty() {
            return;
        }
        let subscribers: Vec<Subscriber> = self.inner.lock().subscribers.values().cloned().collect();
        for event in events {
            for subscriber in &subscribers {
                subscriber(event);
            }
        }
    }
}

fn event(resource: RegistryResourceKind, id: &str, status: RegistrationStatus) -> RegistryEvent {
    RegistryEvent {
        resource,
        id: id.to_string(),
        status,
    }
}

fn applied(resource: RegistryResourceKind, id: String, token: u64) -> Pending {
    let events = vec![event(resource, &id, RegistrationStatus::Applied)];
    let result = RegistrationResult {
        status: RegistrationStatus::Applied,
        handle: RegistrationHandle { resource, id, token },
        conflict: None,
    };
    (result, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Mode;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::atomic::Ordering as AtomicOrdering;

    fn command(id: &str, priority: i32) -> CommandRegistration {
        let mut descriptor = CommandDescriptor::new(id);
        descriptor.modes = vec![Mode::Normal];
        CommandRegistration {
            descriptor,
            callable: CommandCallable::native(|_, _| {}),
            priority,
            lifetime: RegistrationLifetime::Static,
        }
    }

    fn binding(id: &str, command_id: &str, mode: KeybindingMode, gesture: &str) -> KeybindingRegistration {
        KeybindingRegistration {
            descriptor: KeybindingDescriptor {
                id: id.into(),
                command_id: command_id.into(),
                mode,
                gesture: gesture.into(),
                ..KeybindingDescriptor::default()
            },
            priority: 0,
            lifetime: RegistrationLifetime::Session,
        }
    }

    fn core() -> Origin {
        Origin::new(OriginKind::Core, "core")
    }

    fn user() -> Origin {
        Origin::new(OriginKind::User, "user")
    }

    #[test]
    fn test_register_new_command() {
        let registry = Registry::new();
        assert_eq!(registry.version(), 1);

        let result = registry.register_command(command("c1", 0), core());
        assert_eq!(result.status, RegistrationStatus::Applied);
        assert!(result.handle.is_valid());
        assert!(result.conflict.is_none());
        assert_eq!(registry.version(), 2);

        let record = registry.find_command("c1", false).unwrap();
        assert_eq!(record.status, RegistrationStatus::Applied);
        assert_eq!(record.origin, core());
    }

    #[test]
    fn test_user_replaces_core_and_unregister_promotes() {
        let registry = Registry::new();
        registry.register_command(command("c1", 0), core());
        let result = registry.register_command(command("c1", 0), user());

        assert_eq!(result.status, RegistrationStatus::Applied);
        let conflict = result.conflict.unwrap();
        assert_eq!(conflict.winner_origin, Some(user()));
        assert_eq!(conflict.loser_origin, core());
        assert_eq!(
            conflict.message,
            "Replaced command due to higher precedence or priority"
        );
        assert_eq!(registry.find_command("c1", false).unwrap().origin, user());

        assert!(registry.unregister(&result.handle));
        assert_eq!(registry.find_command("c1", false).unwrap().origin, core());
        assert!(!registry.unregister(&result.handle));
    }

    #[test]
    fn test_lower_origin_is_shadowed() {
        let registry = Registry::new();
        registry.register_command(command("c1", 0), user());
        let result = registry.register_command(command("c1", 100), core());

        assert_eq!(result.status, RegistrationStatus::Shadowed);
        assert_eq!(
            result.conflict.unwrap().message,
            "Command shadowed by higher precedence or priority"
        );
        assert_eq!(registry.find_command("c1", false).unwrap().origin, user());
        assert_eq!(registry.version(), 3);
    }

    #[test]
    fn test_priority_breaks_rank_tie() {
        let registry = Registry::new();
        let plugin_a = Origin::new(OriginKind::Plugin, "a");
        let plugin_b = Origin::new(OriginKind::Plugin, "b");
        registry.register_command(command("c1", 1), plugin_a);
        let result = registry.register_command(command("c1", 5), plugin_b.clone());
        assert_eq!(result.status, RegistrationStatus::Applied);
        assert_eq!(registry.find_command("c1", false).unwrap().origin, plugin_b);
    }

    #[test]
    fn test_equal_precedence_tie_break() {
        let registry = Registry::new();
        registry.register_command(command("c1", 0), core());

        let duplicate = registry.register_command(command("c1", 0), core());
        assert_eq!(duplicate.status, RegistrationStatus::Shadowed);
        assert_eq!(
            duplicate.conflict.unwrap().message,
            "Duplicate command ignored (same precedence and priority)"
        );

        let mut incompatible = command("c1", 0);
        incompatible.descriptor.undo_scope = UndoScope::Buffer;
        let version = registry.version();
        let rejected = registry.register_command(incompatible, core());
        assert_eq!(rejected.status, RegistrationStatus::Rejected);
        assert!(!rejected.handle.is_valid());
        assert_eq!(
            rejected.conflict.unwrap().message,
            "Command signature conflict with identical precedence and priority"
        );
        assert_eq!(registry.version(), version);

        assert_eq!(registry.list_conflicts().len(), 2);
    }

    #[test]
    fn test_invalid_registrations_are_logged() {
        let registry = Registry::new();
        let empty = registry.register_command(command("", 0), core());
        assert_eq!(empty.status, RegistrationStatus::Rejected);
        assert_eq!(
            empty.conflict.unwrap().message,
            "Command id must not be empty"
        );

        let mut rpc = command("remote", 0);
        rpc.callable = CommandCallable::Rpc(String::new());
        let result = registry.register_command(rpc, core());
        assert_eq!(result.status, RegistrationStatus::Rejected);

        let conflicts = registry.list_conflicts();
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].winner_origin, None);
        assert_eq!(
            conflicts[1].message,
            "Command callable must provide native callback or RPC endpoint"
        );
        assert_eq!(registry.version(), 1);
    }

    #[test]
    fn test_promotion_order() {
        let registry = Registry::new();
        let top = registry.register_command(command("c1", 0), user());
        let native = Origin::new(OriginKind::Native, "native");
        let plugin_low = Origin::new(OriginKind::Plugin, "low");
        let plugin_first = Origin::new(OriginKind::Plugin, "first");
        let plugin_second = Origin::new(OriginKind::Plugin, "second");

        registry.register_command(command("c1", 9), native);
        registry.register_command(command("c1", 0), plugin_low);
        registry.register_command(command("c1", 3), plugin_first.clone());
        registry.register_command(command("c1", 3), plugin_second);

        registry.unregister(&top.handle);
        assert_eq!(registry.find_command("c1", false).unwrap().origin, plugin_first);
    }

    #[test]
    fn test_unregister_shadowed_entry() {
        let registry = Registry::new();
        registry.register_command(command("c1", 0), user());
        let shadowed = registry.register_command(command("c1", 0), core());
        let version = registry.version();

        assert!(registry.unregister(&shadowed.handle));
        assert_eq!(registry.version(), version + 1);
        assert!(!registry.unregister(&shadowed.handle));
        assert!(registry.find_command("c1", true).is_some());
    }

    #[test]
    fn test_unregister_invalid_handle() {
        let registry = Registry::new();
        let handle = RegistrationHandle::invalid(RegistryResourceKind::Command, "c1");
        assert!(!registry.unregister(&handle));
        let unknown = RegistrationHandle {
            resource: RegistryResourceKind::Theme,
            id: "dark".into(),
            token: 7,
        };
        assert!(!registry.unregister(&unknown));
    }

    #[test]
    fn test_find_command_after_promotion() {
        let registry = Registry::new();
        let active = registry.register_command(command("c1", 0), user());
        registry.register_command(command("c1", 0), core());

        let record = registry.find_command("c1", true).unwrap();
        assert_eq!(record.status, RegistrationStatus::Applied);

        registry.unregister(&active.handle);
        let record = registry.find_command("c1", true).unwrap();
        assert_eq!(record.origin, core());
        assert!(registry.find_command("missing", true).is_none());
    }

    #[test]
    fn test_keybinding_resolution_falls_back_to_any() {
        let registry = Registry::new();
        registry.register_keybinding(binding("b.any", "c.any", KeybindingMode::Any, "Q"), core());
        registry.register_keybinding(
            binding("b.normal", "c.normal", KeybindingMode::Normal, "j"),
            core(),
        );

        let exact = registry.resolve_keybinding(KeybindingMode::Normal, "j").unwrap();
        assert_eq!(exact.descriptor.command_id, "c.normal");

        let fallback = registry.resolve_keybinding(KeybindingMode::Insert, "Q").unwrap();
        assert_eq!(fallback.descriptor.command_id, "c.any");

        assert!(registry.resolve_keybinding(KeybindingMode::Insert, "j").is_none());
    }

    #[test]
    fn test_keybinding_validation() {
        let registry = Registry::new();
        let empty_id = registry.register_keybinding(binding("", "c", KeybindingMode::Normal, "j"), core());
        assert_eq!(
            empty_id.conflict.unwrap().message,
            "Keybinding id must not be empty"
        );
        let empty_gesture = registry.register_keybinding(binding("b", "c", KeybindingMode::Normal, ""), core());
        assert_eq!(
            empty_gesture.conflict.unwrap().message,
            "Keybinding gesture must not be empty"
        );

        registry.register_keybinding(binding("b1", "c", KeybindingMode::Normal, "j"), core());
        let reused = registry.register_keybinding(binding("b1", "c", KeybindingMode::Normal, "k"), user());
        assert_eq!(reused.status, RegistrationStatus::Rejected);
        let conflict = reused.conflict.unwrap();
        assert_eq!(conflict.message, "Keybinding id already registered");
        assert_eq!(conflict.winner_origin, Some(core()));
    }

    #[test]
    fn test_keybinding_precedence() {
        let registry = Registry::new();
        let base = registry.register_keybinding(binding("core.j", "down", KeybindingMode::Normal, "j"), core());

        let same = registry.register_keybinding(binding("core.j2", "down", KeybindingMode::Normal, "j"), core());
        assert_eq!(same.status, RegistrationStatus::Shadowed);
        assert_eq!(
            same.conflict.unwrap().message,
            "Duplicate keybinding ignored (same precedence and priority)"
        );

        let clash = registry.register_keybinding(binding("core.j3", "other", KeybindingMode::Normal, "j"), core());
        assert_eq!(clash.status, RegistrationStatus::Rejected);
        assert_eq!(
            clash.conflict.unwrap().message,
            "Conflicting keybinding with identical precedence and priority"
        );
        assert!(registry.find_keybinding("core.j3", true).is_none());

        let over = registry.register_keybinding(binding("user.j", "custom", KeybindingMode::Normal, "j"), user());
        assert_eq!(over.status, RegistrationStatus::Applied);
        assert_eq!(
            registry.resolve_keybinding(KeybindingMode::Normal, "j").unwrap().descriptor.command_id,
            "custom"
        );
        assert_eq!(
            registry.find_keybinding("core.j", true).unwrap().status,
            RegistrationStatus::Shadowed
        );

        assert!(registry.unregister(&over.handle));
        let promoted = registry.resolve_keybinding(KeybindingMode::Normal, "j").unwrap();
        assert_eq!(promoted.descriptor.id, "core.j");
        assert!(registry.unregister(&base.handle));
        let promoted = registry.resolve_keybinding(KeybindingMode::Normal, "j").unwrap();
        assert_eq!(promoted.descriptor.id, "core.j2");
        assert!(registry.unregister(&same.handle));
        assert!(registry.resolve_keybinding(KeybindingMode::Normal, "j").is_none());
        assert!(registry.list_keybindings().is_empty());
    }

    #[test]
    fn test_subscribers_see_events_in_order() {
        let registry = Registry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let token = registry.subscribe(move |event| sink.lock().push(event.clone()));
        assert_ne!(token, 0);

        registry.register_command(command("c1", 0), core());
        let replaced = registry.register_command(command("c1", 0), user());
        registry.unregister(&replaced.handle);

        let statuses: Vec<_> = seen.lock().iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                RegistrationStatus::Applied,
                RegistrationStatus::Shadowed,
                RegistrationStatus::Applied,
                RegistrationStatus::Rejected,
            ]
        );

        assert!(registry.unsubscribe(token));
        assert!(!registry.unsubscribe(token));
        assert!(!registry.unsubscribe(0));
        registry.register_command(command("c2", 0), core());
        assert_eq!(seen.lock().len(), 4);
    }

    #[test]
    fn test_subscriber_may_reenter_registry() {
        let registry = Arc::new(Registry::new());
        let weak = Arc::downgrade(&registry);
        let fired = Arc::new(AtomicBool::new(false));
        let calls = Arc::new(AtomicUsize::new(0));

        let fired_flag = Arc::clone(&fired);
        let call_count = Arc::clone(&calls);
        registry.subscribe(move |event| {
            call_count.fetch_add(1, AtomicOrdering::SeqCst);
            let Some(registry) = weak.upgrade() else {
                return;
            };
            assert!(registry.version() > 1);
            if event.id == "c1" && !fired_flag.swap(true, AtomicOrdering::SeqCst) {
                registry.register_keybinding(
                    binding("c1.binding", "c1", KeybindingMode::Normal, "z"),
                    Origin::new(OriginKind::Plugin, "watcher"),
                );
            }
        });

        registry.register_command(command("c1", 0), core());
        assert!(fired.load(AtomicOrdering::SeqCst));
        assert!(registry.resolve_keybinding(KeybindingMode::Normal, "z").is_some());
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 2);
    }

    #[test]
    fn test_lists_are_sorted() {
        let registry = Registry::new();
        registry.register_command(command("b", 0), core());
        registry.register_command(command("a", 0), core());
        let ids: Vec<_> = registry
            .list_commands()
            .into_iter()
            .map(|r| r.descriptor.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
