#![forbid(unsafe_code)]

//! Manager-wide observers.
//!
//! A [`ManagerCallback`] watches every state transition the manager makes:
//! executions, undo and redo, group runs, history mutations, cursor moves,
//! and error reports. Handles are shared [`Arc`]s; removal matches by
//! handle identity.
//!
//! Notification always iterates a snapshot taken before the pass, so an
//! observer may add or remove observers, including itself, while being
//! notified. Changes take effect from the next pass onwards.

use crate::command::{Command, CommandOutcome};
use crate::group::CommandGroup;
use crate::history::HistoryEntry;
use crate::line::CommandLine;
use std::fmt;
use std::sync::Arc;

/// Observer of every manager state transition. All hooks default to no-ops.
pub trait ManagerCallback: Send + Sync {
    /// Before a command body runs. `group` is set when the execution is a
    /// group member.
    fn on_pre_execute(
        &self,
        _group: Option<&CommandGroup>,
        _command: &dyn Command,
        _line: &CommandLine,
    ) {
    }

    /// After a command body ran, whatever the outcome.
    fn on_post_execute(
        &self,
        _group: Option<&CommandGroup>,
        _command: &dyn Command,
        _line: &CommandLine,
        _outcome: &CommandOutcome,
    ) {
    }

    /// Before a command is undone.
    fn on_pre_undo(&self, _command: &dyn Command, _line: &CommandLine) {}

    /// After a command was undone, whatever the outcome.
    fn on_post_undo(&self, _command: &dyn Command, _line: &CommandLine) {}

    /// Before a group run. `undoing` is true when the run reverts the group.
    fn on_pre_execute_group(&self, _group: &CommandGroup, _undoing: bool) {}

    /// After a group run finished or aborted.
    fn on_post_execute_group(&self, _group: &CommandGroup, _succeeded: bool) {}

    /// A new entry landed in the history at `index`.
    fn on_history_pushed(&self, _index: usize, _entry: &HistoryEntry) {}

    /// The entry at `index` left the history (redo-tail discard, capacity
    /// eviction, or shrinking the limit). Indices are as observed at
    /// removal time.
    fn on_history_removed(&self, _index: usize) {}

    /// The undo/redo cursor moved. `None` means everything is undone.
    fn on_cursor_moved(&self, _cursor: Option<usize>) {}

    /// The error accumulator was flushed.
    fn on_error_report(&self, _errors: &[String]) {}
}

/// Ordered set of shared observer handles.
#[derive(Default)]
pub struct CallbackSet {
    callbacks: Vec<Arc<dyn ManagerCallback>>,
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("len", &self.callbacks.len())
            .finish()
    }
}

impl CallbackSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer. Observers are notified in insertion order; the
    /// same handle may be added more than once.
    pub fn add(&mut self, callback: Arc<dyn ManagerCallback>) {
        self.callbacks.push(callback);
    }

    /// Detach every attachment of the handle. Returns whether anything was
    /// removed.
    pub fn remove(&mut self, callback: &Arc<dyn ManagerCallback>) -> bool {
        let before = self.callbacks.len();
        self.callbacks
            .retain(|existing| !Arc::ptr_eq(existing, callback));
        self.callbacks.len() != before
    }

    /// Detach everything.
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// Number of attached observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether no observer is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// The observer at `index`, in insertion order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<dyn ManagerCallback>> {
        self.callbacks.get(index)
    }

    /// Clone the handle list for one notification pass.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<dyn ManagerCallback>> {
        self.callbacks.clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
