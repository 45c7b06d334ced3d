#![forbid(unsafe_code)]

//! Bounded command history with an undo/redo cursor.
//!
//! The history is a single bounded buffer of [`HistoryEntry`] values plus a
//! cursor marking the most recently executed entry that has not been
//! undone. Undo moves the cursor back without removing entries; redo moves
//! it forward. Executing something new discards the entries after the
//! cursor (the redo tail) and appends.
//!
//! ```text
//! push A, push B, push C          undo x2                push D
//! ┌──────────────────┐     ┌──────────────────┐    ┌──────────────────┐
//! │ [A, B, C]        │     │ [A, B, C]        │    │ [A, D]           │
//! │        ^cursor   │     │  ^cursor         │    │     ^cursor      │
//! └──────────────────┘     └──────────────────┘    └──────────────────┘
//!                                                   B and C discarded
//! ```
//!
//! # Invariants
//!
//! 1. `cursor`, when set, is a valid index; `None` means everything is
//!    undone (or the buffer is empty).
//! 2. After any push the cursor sits on the last entry.
//! 3. `len() <= max_items()`; pushing at capacity evicts the oldest entry.
//! 4. Item numbers increase strictly and are never reassigned or reused,
//!    across eviction, redo-tail discards, and [`CommandHistory::clear`].
//!
//! This type only moves data; callbacks, logging, and the actual command
//! execution live in the manager.

use crate::command::Command;
use crate::group::CommandGroup;
use crate::line::CommandLine;
use std::collections::VecDeque;
use std::fmt;

/// What a history entry holds: one executed command or one executed group.
#[derive(Debug)]
pub enum HistoryAction {
    /// A single executed command instance with the argument line it used.
    Single {
        /// The executed instance, owning its captured undo state.
        command: Box<dyn Command>,
        /// The argument line the instance was executed with.
        line: CommandLine,
    },
    /// An executed group owning its member instances.
    Group(CommandGroup),
}

/// One recorded execution.
#[derive(Debug)]
pub struct HistoryEntry {
    /// Globally unique, monotonically increasing number assigned at push.
    /// Independent of buffer position and unaffected by undo/redo.
    item_nr: u64,
    action: HistoryAction,
}

impl HistoryEntry {
    pub(crate) fn new(item_nr: u64, action: HistoryAction) -> Self {
        Self { item_nr, action }
    }

    /// The entry's permanent item number.
    #[must_use]
    pub fn item_nr(&self) -> u64 {
        self.item_nr
    }

    /// The recorded action.
    #[must_use]
    pub fn action(&self) -> &HistoryAction {
        &self.action
    }

    pub(crate) fn action_mut(&mut self) -> &mut HistoryAction {
        &mut self.action
    }

    /// Name of the recorded command or group.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.action {
            HistoryAction::Single { command, .. } => command.name(),
            HistoryAction::Group(group) => group.name(),
        }
    }

    /// Human-readable rendering, `"007 - CreateBox"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:03} - {}", self.item_nr, self.name())
    }

    /// Whether the entry records a group execution.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.action, HistoryAction::Group(_))
    }

    /// The executed command, for single-command entries.
    #[must_use]
    pub fn command(&self) -> Option<&dyn Command> {
        match &self.action {
            HistoryAction::Single { command, .. } => Some(command.as_ref()),
            HistoryAction::Group(_) => None,
        }
    }

    /// The argument line, for single-command entries.
    #[must_use]
    pub fn command_line(&self) -> Option<&CommandLine> {
        match &self.action {
            HistoryAction::Single { line, .. } => Some(line),
            HistoryAction::Group(_) => None,
        }
    }

    /// The executed group, for group entries.
    #[must_use]
    pub fn group(&self) -> Option<&CommandGroup> {
        match &self.action {
            HistoryAction::Single { .. } => None,
            HistoryAction::Group(group) => Some(group),
        }
    }
}

/// What a push did to the buffer, so the manager can notify observers.
pub(crate) struct PushReport {
    /// Item number assigned to the new entry.
    pub item_nr: u64,
    /// Final index of the new entry.
    pub index: usize,
    /// Indices removed, in removal order, as they were at removal time:
    /// redo-tail indices descending, then `0` per capacity eviction.
    pub removed_indices: Vec<usize>,
}

/// The bounded history buffer.
pub struct CommandHistory {
    /// Entries, oldest at the front.
    entries: VecDeque<HistoryEntry>,
    /// Index of the most recently executed, not yet undone entry.
    cursor: Option<usize>,
    /// Capacity; pushing beyond it evicts from the front.
    max_items: usize,
    /// Next item number to assign. Starts at 1 and never goes back.
    next_item_nr: u64,
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("max_items", &self.max_items)
            .field("next_item_nr", &self.next_item_nr)
            .finish()
    }
}

impl CommandHistory {
    /// Capacity is clamped to at least one entry.
    pub(crate) fn new(max_items: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            max_items: max_items.max(1),
            next_item_nr: 1,
        }
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position. `None` when everything is undone.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Configured capacity.
    #[must_use]
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Total item numbers assigned since creation.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.next_item_nr - 1
    }

    /// Entry at `index`, oldest first.
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> Option<&mut HistoryEntry> {
        self.entries.get_mut(index)
    }

    /// Iterate entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Whether an undo target exists.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    /// Whether a redo target exists.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.redo_target().is_some()
    }

    /// Index of the entry a redo would re-execute.
    #[must_use]
    pub fn redo_target(&self) -> Option<usize> {
        match self.cursor {
            None if !self.entries.is_empty() => Some(0),
            Some(c) if c + 1 < self.entries.len() => Some(c + 1),
            _ => None,
        }
    }

    /// Append an entry: discard the redo tail, assign the next item number,
    /// evict from the front when over capacity, and land the cursor on the
    /// new entry.
    pub(crate) fn push(&mut self, action: HistoryAction) -> PushReport {
        let mut removed_indices = Vec::new();

        // Discard everything after the cursor.
        let keep = match self.cursor {
            Some(c) => c + 1,
            None => 0,
        };
        while self.entries.len() > keep {
            removed_indices.push(self.entries.len() - 1);
            self.entries.pop_back();
        }

        let item_nr = self.next_item_nr;
        self.next_item_nr += 1;
        self.entries.push_back(HistoryEntry::new(item_nr, action));

        while self.entries.len() > self.max_items {
            self.entries.pop_front();
            removed_indices.push(0);
        }

        let index = self.entries.len() - 1;
        self.cursor = Some(index);
        PushReport {
            item_nr,
            index,
            removed_indices,
        }
    }

    /// Move the cursor one entry back. The caller checked [`Self::can_undo`].
    pub(crate) fn step_back(&mut self) {
        self.cursor = match self.cursor {
            Some(0) | None => None,
            Some(c) => Some(c - 1),
        };
    }

    /// Move the cursor one entry forward onto the redo target.
    pub(crate) fn step_forward(&mut self) {
        self.cursor = match self.cursor {
            None => Some(0),
            Some(c) => Some(c + 1),
        };
    }

    /// Shrink or grow the capacity, evicting oldest entries as needed.
    /// Returns the removal indices in order (always the front).
    pub(crate) fn set_max_items(&mut self, max_items: usize) -> Vec<usize> {
        self.max_items = max_items.max(1);
        let mut removed = Vec::new();
        while self.entries.len() > self.max_items {
            self.entries.pop_front();
            removed.push(0);
            self.cursor = match self.cursor {
                Some(0) | None => None,
                Some(c) => Some(c - 1),
            };
        }
        removed
    }

    /// Drop every entry and reset the cursor. Item numbering keeps rising.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutcome;
    use crate::manager::CommandContext;

    struct Null {
        name: String,
    }

    impl Command for Null {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_undoable(&self) -> bool {
            true
        }

        fn execute(&mut self, _ctx: &mut CommandContext<'_>, _line: &CommandLine) -> CommandOutcome {
            Ok(String::new())
        }

        fn undo(&mut self, _ctx: &mut CommandContext<'_>, _line: &CommandLine) -> CommandOutcome {
            Ok(String::new())
        }

        fn clone_prototype(&self) -> Box<dyn Command> {
            Box::new(Null {
                name: self.name.clone(),
            })
        }
    }

    fn push_null(history: &mut CommandHistory, name: &str) -> PushReport {
        let line = CommandLine::parse(name).unwrap();
        history.push(HistoryAction::Single {
            command: Box::new(Null {
                name: name.to_string(),
            }),
            line,
        })
    }

    #[test]
    fn test_new_history() {
        let history = CommandHistory::new(100);
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.total_items(), 0);
    }

    #[test]
    fn test_capacity_clamped_to_one() {
        let history = CommandHistory::new(0);
        assert_eq!(history.max_items(), 1);
    }

    #[test]
    fn test_push_lands_cursor_on_new_entry() {
        let mut history = CommandHistory::new(100);
        let a = push_null(&mut history, "A");
        assert_eq!(a.item_nr, 1);
        assert_eq!(a.index, 0);
        assert!(a.removed_indices.is_empty());
        assert_eq!(history.cursor(), Some(0));

        let b = push_null(&mut history, "B");
        assert_eq!(b.item_nr, 2);
        assert_eq!(history.cursor(), Some(1));
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_cursor_movement() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        push_null(&mut history, "B");

        history.step_back();
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(history.redo_target(), Some(1));

        history.step_back();
        assert_eq!(history.cursor(), None);
        assert_eq!(history.redo_target(), Some(0));
        assert!(!history.can_undo());

        history.step_forward();
        assert_eq!(history.cursor(), Some(0));
        history.step_forward();
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.redo_target(), None);
    }

    #[test]
    fn test_push_discards_redo_tail() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        push_null(&mut history, "B");
        push_null(&mut history, "C");
        history.step_back();
        history.step_back();
        // Cursor on A; B and C form the redo tail.

        let d = push_null(&mut history, "D");
        assert_eq!(d.removed_indices, vec![2, 1]);
        assert_eq!(d.item_nr, 4);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entry(0).unwrap().name(), "A");
        assert_eq!(history.entry(1).unwrap().name(), "D");
        assert_eq!(history.cursor(), Some(1));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_after_full_undo_discards_everything() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        push_null(&mut history, "B");
        history.step_back();
        history.step_back();

        let c = push_null(&mut history, "C");
        assert_eq!(c.removed_indices, vec![1, 0]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.entry(0).unwrap().name(), "C");
    }

    #[test]
    fn test_capacity_eviction_keeps_item_numbers() {
        let mut history = CommandHistory::new(2);
        push_null(&mut history, "A");
        push_null(&mut history, "B");
        let c = push_null(&mut history, "C");

        assert_eq!(c.removed_indices, vec![0]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entry(0).unwrap().item_nr(), 2);
        assert_eq!(history.entry(1).unwrap().item_nr(), 3);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.total_items(), 3);
    }

    #[test]
    fn test_item_numbers_survive_clear() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);

        let b = push_null(&mut history, "B");
        assert_eq!(b.item_nr, 2);
    }

    #[test]
    fn test_set_max_items_truncates_oldest() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        push_null(&mut history, "B");
        push_null(&mut history, "C");

        let removed = history.set_max_items(2);
        assert_eq!(removed, vec![0]);
        assert_eq!(history.len(), 2);
        assert_eq!(history.entry(0).unwrap().name(), "B");
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_set_max_items_adjusts_undone_cursor() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        push_null(&mut history, "B");
        push_null(&mut history, "C");
        history.step_back();
        history.step_back();
        // Cursor on A.

        let removed = history.set_max_items(1);
        assert_eq!(removed, vec![0, 0]);
        assert_eq!(history.len(), 1);
        assert_eq!(history.entry(0).unwrap().name(), "C");
        assert_eq!(history.cursor(), None);
        // C is still in the redo tail.
        assert_eq!(history.redo_target(), Some(0));
    }

    #[test]
    fn test_entry_accessors_and_label() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "CreateBox");
        let entry = history.entry(0).unwrap();
        assert_eq!(entry.name(), "CreateBox");
        assert_eq!(entry.label(), "001 - CreateBox");
        assert!(!entry.is_group());
        assert!(entry.command().is_some());
        assert!(entry.command_line().is_some());
        assert!(entry.group().is_none());
    }

    #[test]
    fn test_group_entry_accessors() {
        let mut history = CommandHistory::new(100);
        let group = CommandGroup::new("Build scene");
        history.push(HistoryAction::Group(group));

        let entry = history.entry(0).unwrap();
        assert!(entry.is_group());
        assert_eq!(entry.name(), "Build scene");
        assert!(entry.command().is_none());
        assert!(entry.group().is_some());
    }

    #[test]
    fn test_iter_is_oldest_first() {
        let mut history = CommandHistory::new(100);
        push_null(&mut history, "A");
        push_null(&mut history, "B");
        let names: Vec<_> = history.iter().map(HistoryEntry::name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
