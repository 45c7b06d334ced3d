#![forbid(unsafe_code)]

//! Batching of commands into one history entry.
//!
//! A [`CommandGroup`] is built from raw command strings and executed as a
//! unit: the manager runs every member through the normal single-command
//! path (without individual history recording) and, when all members
//! succeed, pushes the whole group as one entry. Undoing the entry reverts
//! the members in reverse execution order.
//!
//! Members that already ran are never rolled back when a later member
//! fails; compensating for partial application is the caller's decision.

use crate::command::Command;
use crate::line::CommandLine;
use std::fmt;

/// An ordered set of command strings executed and undone as one unit.
pub struct CommandGroup {
    /// Name shown in the history.
    name: String,
    /// Raw member command strings, in execution order.
    commands: Vec<String>,
    /// Keep executing members after one fails. Off by default: the first
    /// failure aborts the remaining members.
    continue_after_error: bool,
    /// Whether a fully successful run may be recorded for undo.
    undoable: bool,
    /// Executed member instances with their parsed lines, filled in by the
    /// manager during execution. Drives undo and redo of the entry.
    executed: Vec<(Box<dyn Command>, CommandLine)>,
}

impl fmt::Debug for CommandGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandGroup")
            .field("name", &self.name)
            .field("commands", &self.commands.len())
            .field("executed", &self.executed.len())
            .field("continue_after_error", &self.continue_after_error)
            .field("undoable", &self.undoable)
            .finish()
    }
}

impl CommandGroup {
    /// Create an empty group with the name shown in the history.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
            continue_after_error: false,
            undoable: true,
            executed: Vec::new(),
        }
    }

    /// Group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append one member command string.
    pub fn add_command(&mut self, text: impl Into<String>) {
        self.commands.push(text.into());
    }

    /// Append every member of another group, in order.
    pub fn add_group(&mut self, other: &CommandGroup) {
        self.commands.extend(other.commands.iter().cloned());
    }

    /// Number of member command strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The raw member string at `index`.
    #[must_use]
    pub fn command_text(&self, index: usize) -> Option<&str> {
        self.commands.get(index).map(String::as_str)
    }

    /// Remove all members and any executed state.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.executed.clear();
    }

    /// Keep executing members after one fails.
    pub fn set_continue_after_error(&mut self, continue_after_error: bool) {
        self.continue_after_error = continue_after_error;
    }

    /// Whether member failures abort the rest of the group.
    #[must_use]
    pub fn continue_after_error(&self) -> bool {
        self.continue_after_error
    }

    /// Allow or forbid recording a successful run for undo.
    pub fn set_undoable(&mut self, undoable: bool) {
        self.undoable = undoable;
    }

    /// Whether a successful run may be recorded for undo.
    #[must_use]
    pub fn is_undoable(&self) -> bool {
        self.undoable
    }

    /// Number of members executed so far.
    #[must_use]
    pub fn num_executed(&self) -> usize {
        self.executed.len()
    }

    /// The executed member instance at `index`, in execution order.
    #[must_use]
    pub fn executed_command(&self, index: usize) -> Option<&dyn Command> {
        self.executed.get(index).map(|(command, _)| command.as_ref())
    }

    /// The parsed line of the executed member at `index`.
    #[must_use]
    pub fn executed_line(&self, index: usize) -> Option<&CommandLine> {
        self.executed.get(index).map(|(_, line)| line)
    }

    pub(crate) fn record_executed(&mut self, command: Box<dyn Command>, line: CommandLine) {
        self.executed.push((command, line));
    }

    pub(crate) fn executed_mut(&mut self) -> &mut [(Box<dyn Command>, CommandLine)] {
        &mut self.executed
    }

    /// Detach the executed members so they can be re-run while observers
    /// still see the group. Pair with [`CommandGroup::restore_executed`].
    pub(crate) fn take_executed(&mut self) -> Vec<(Box<dyn Command>, CommandLine)> {
        std::mem::take(&mut self.executed)
    }

    pub(crate) fn restore_executed(&mut self, executed: Vec<(Box<dyn Command>, CommandLine)>) {
        self.executed = executed;
    }
}

// ============================================================================
// Tests
// ============================================================================
