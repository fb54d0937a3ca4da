//! Partially typed normal-mode commands: counts, operator, find target.

/// Largest repeat count accepted while typing or after combining.
pub const MAX_COUNT: usize = 1_000_000;

/// Operators that take a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `d`
    Delete,
    /// `y`
    Yank,
}

impl Operator {
    /// Key that starts the operator.
    pub const fn key(self) -> char {
        match self {
            Self::Delete => 'd',
            Self::Yank => 'y',
        }
    }

    /// Past tense used in status messages.
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Delete => "Deleted",
            Self::Yank => "Yanked",
        }
    }

    /// Message when the motion covers no text.
    pub const fn nothing_message(self) -> &'static str {
        match self {
            Self::Delete => "Nothing to delete",
            Self::Yank => "Nothing to yank",
        }
    }
}

/// Direction and landing rule of a find motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FindSpec {
    /// Search toward the start of the line.
    pub backward: bool,
    /// Stop one cell short of the match (`t`/`T`).
    pub till: bool,
}

impl FindSpec {
    /// Parse `f`, `F`, `t` or `T`.
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'f' => Some(Self { backward: false, till: false }),
            'F' => Some(Self { backward: true, till: false }),
            't' => Some(Self { backward: false, till: true }),
            'T' => Some(Self { backward: true, till: true }),
            _ => None,
        }
    }

    /// The key that produces this find.
    pub const fn key(self) -> char {
        match (self.backward, self.till) {
            (false, false) => 'f',
            (true, false) => 'F',
            (false, true) => 't',
            (true, true) => 'T',
        }
    }

    /// Same find, opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            backward: !self.backward,
            till: self.till,
        }
    }
}

/// The most recent successful find, for `;` and `,`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastFind {
    /// Character searched for.
    pub target: char,
    /// How it was searched.
    pub find: FindSpec,
}

/// What the next key completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingCommand {
    /// Nothing typed yet.
    #[default]
    None,
    /// `d` or `y`, waiting for a motion.
    Operator(Operator),
    /// `g`, waiting for a second key.
    Goto,
    /// `f`/`F`/`t`/`T`, waiting for the target, possibly under an operator.
    Find {
        /// Find direction and landing.
        find: FindSpec,
        /// Operator applied over the found range.
        operator: Option<Operator>,
    },
}

impl PendingCommand {
    fn label(self) -> String {
        match self {
            Self::None => String::new(),
            Self::Operator(op) => op.key().to_string(),
            Self::Goto => "g".to_string(),
            Self::Find { find, operator } => {
                let mut label = String::new();
                if let Some(op) = operator {
                    label.push(op.key());
                }
                label.push(find.key());
                label
            }
        }
    }
}

/// Counts and pending command of the normal-mode grammar.
#[derive(Debug, Clone, Default)]
pub struct PendingInput {
    command: PendingCommand,
    prefix_count: Option<usize>,
    motion_count: Option<usize>,
    last_find: Option<LastFind>,
}

impl PendingInput {
    /// Nothing pending, no find history.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending command.
    pub const fn command(&self) -> PendingCommand {
        self.command
    }

    /// Replace the pending command, keeping counts.
    pub const fn set_command(&mut self, command: PendingCommand) {
        self.command = command;
    }

    /// Whether a command letter is waiting for completion.
    pub fn has_command(&self) -> bool {
        self.command != PendingCommand::None
    }

    /// Whether any count digit has been typed.
    pub const fn has_count(&self) -> bool {
        self.prefix_count.is_some() || self.motion_count.is_some()
    }

    /// Add a digit to the prefix count, or to the motion count once a
    /// command is pending. Saturates at [`MAX_COUNT`].
    pub fn push_digit(&mut self, digit: u32) {
        let slot = if self.has_command() {
            &mut self.motion_count
        } else {
            &mut self.prefix_count
        };
        let current = slot.unwrap_or(0);
        let next = current
            .saturating_mul(10)
            .saturating_add(digit as usize)
            .min(MAX_COUNT);
        *slot = Some(next);
    }

    /// Combined count if any digits were typed. Resets both counts.
    ///
    /// Prefix and motion counts multiply (`2d3w` is six words), capped at
    /// [`MAX_COUNT`].
    pub fn take_explicit_count(&mut self) -> Option<usize> {
        match (self.prefix_count.take(), self.motion_count.take()) {
            (Some(prefix), Some(motion)) => Some(prefix.saturating_mul(motion).min(MAX_COUNT)),
            (Some(n), None) | (None, Some(n)) => Some(n),
            (None, None) => None,
        }
    }

    /// Combined count, or `fallback` when none was typed. Resets both counts.
    pub fn take_count(&mut self, fallback: usize) -> usize {
        self.take_explicit_count().unwrap_or(fallback)
    }

    /// Drop the pending command and both counts. Find history survives.
    pub const fn clear(&mut self) {
        self.command = PendingCommand::None;
        self.prefix_count = None;
        self.motion_count = None;
    }

    /// Text shown while a command is being typed, e.g. `2d3`.
    pub fn status_text(&self) -> String {
        let mut text = String::new();
        if let Some(n) = self.prefix_count {
            text.push_str(&n.to_string());
        }
        text.push_str(&self.command.label());
        if let Some(n) = self.motion_count {
            text.push_str(&n.to_string());
        }
        text
    }

    /// Most recent successful find.
    pub const fn last_find(&self) -> Option<LastFind> {
        self.last_find
    }

    /// Remember a successful find.
    pub const fn set_last_find(&mut self, last: LastFind) {
        self.last_find = Some(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prefix_and_motion_counts_multiply() {
        let mut pending = PendingInput::new();
        pending.push_digit(2);
        pending.set_command(PendingCommand::Operator(Operator::Delete));
        pending.push_digit(3);
        assert_eq!(pending.status_text(), "2d3");
        assert_eq!(pending.take_count(1), 6);
        assert!(!pending.has_count());
        assert_eq!(pending.take_count(1), 1);
    }

    #[test]
    fn test_single_counts() {
        let mut pending = PendingInput::new();
        pending.push_digit(4);
        pending.push_digit(2);
        assert_eq!(pending.take_explicit_count(), Some(42));

        pending.set_command(PendingCommand::Operator(Operator::Yank));
        pending.push_digit(7);
        assert_eq!(pending.take_count(9), 7);
        assert_eq!(pending.take_explicit_count(), None);
    }

    #[test]
    fn test_clear_keeps_last_find() {
        let mut pending = PendingInput::new();
        let last = LastFind {
            target: 'x',
            find: FindSpec::from_key('t').unwrap(),
        };
        pending.set_last_find(last);
        pending.set_command(PendingCommand::Goto);
        pending.push_digit(5);
        pending.clear();
        assert!(!pending.has_command());
        assert!(!pending.has_count());
        assert_eq!(pending.last_find(), Some(last));
    }

    #[test]
    fn test_find_labels() {
        let mut pending = PendingInput::new();
        pending.push_digit(3);
        pending.set_command(PendingCommand::Find {
            find: FindSpec::from_key('F').unwrap(),
            operator: Some(Operator::Delete),
        });
        assert_eq!(pending.status_text(), "3dF");
        assert_eq!(FindSpec::from_key('t').unwrap().reversed().key(), 'T');
        assert_eq!(FindSpec::from_key('x'), None);
    }

    proptest! {
        #[test]
        fn test_counts_never_exceed_cap(
            prefix in proptest::collection::vec(0u32..10, 1..12),
            motion in proptest::collection::vec(0u32..10, 1..12),
        ) {
            let mut pending = PendingInput::new();
            for d in &prefix {
                pending.push_digit(*d);
            }
            pending.set_command(PendingCommand::Operator(Operator::Delete));
            for d in &motion {
                pending.push_digit(*d);
            }
            let count = pending.take_count(1);
            prop_assert!(count <= MAX_COUNT);
        }

        #[test]
        fn test_small_counts_compose_exactly(p in 1usize..1000, m in 1usize..1000) {
            let mut pending = PendingInput::new();
            for d in p.to_string().chars() {
                pending.push_digit(d.to_digit(10).unwrap());
            }
            pending.set_command(PendingCommand::Operator(Operator::Yank));
            for d in m.to_string().chars() {
                pending.push_digit(d.to_digit(10).unwrap());
            }
            prop_assert_eq!(pending.take_count(1), p * m);
        }
    }
}
