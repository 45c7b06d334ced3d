#![forbid(unsafe_code)]

//! The command capability and per-command observers.
//!
//! A command is an opaque, reversible unit of work addressed by a
//! case-insensitive name. Implementations are registered once as stateless
//! prototypes; every execution clones a fresh instance from the prototype,
//! and that instance captures whatever it needs for undo while `execute`
//! runs. Once an execution is recorded, the instance and its argument line
//! are owned by the history entry.
//!
//! Bodies receive a [`CommandContext`] and may run nested commands through
//! it; nested work joins the error report of the enclosing top-level call
//! and is never recorded for undo on its own.
//!
//! # Invariants
//!
//! - For commands reporting [`Command::is_undoable`], `execute` followed by
//!   `undo` on the same instance restores prior state.
//! - Redo is re-execution: the manager calls `execute` again on the stored
//!   instance, which refreshes its captured undo state.

use crate::line::CommandLine;
use crate::manager::CommandContext;
use crate::syntax::CommandSyntax;
use std::fmt;

/// Outcome of a command body: result text on success, error text on failure.
pub type CommandOutcome = std::result::Result<String, String>;

/// A reversible, named unit of work.
pub trait Command: Send + Sync {
    /// Unique command name. Matching is case-insensitive.
    fn name(&self) -> &str;

    /// Whether executions of this command are recorded for undo.
    fn is_undoable(&self) -> bool {
        false
    }

    /// Declared parameters, validated before every execution.
    ///
    /// The default empty declaration skips validation entirely.
    fn syntax(&self) -> CommandSyntax {
        CommandSyntax::new()
    }

    /// Apply the command.
    ///
    /// `ctx` runs nested commands on behalf of this one; their failures land
    /// in the same error report as this command's own.
    fn execute(&mut self, ctx: &mut CommandContext<'_>, line: &CommandLine) -> CommandOutcome;

    /// Revert the command, using the state captured during `execute`.
    ///
    /// Only called on instances whose execution was recorded, which implies
    /// [`Command::is_undoable`] returned `true`. Undo bodies may use `ctx`
    /// the same way execute bodies do.
    fn undo(&mut self, _ctx: &mut CommandContext<'_>, _line: &CommandLine) -> CommandOutcome {
        Err(format!("command '{}' cannot be undone", self.name()))
    }

    /// Create a fresh instance for one execution.
    ///
    /// Prototypes stay registered for the process lifetime; instances carry
    /// the per-execution undo state.
    fn clone_prototype(&self) -> Box<dyn Command>;
}

impl fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name())
            .field("is_undoable", &self.is_undoable())
            .finish()
    }
}

/// Observer attached to one registered command.
///
/// The manager invokes these hooks around every execution and undo of the
/// command the observer is registered on, including executions that happen
/// as group members and as redo. Hooks default to no-ops. Handles are
/// shared, so implementations needing state use interior mutability.
pub trait CommandCallback: Send + Sync {
    /// Called right before the command body runs.
    fn pre_execute(&self, _command: &dyn Command, _line: &CommandLine) {}

    /// Called right after the command body ran, whatever the outcome.
    fn post_execute(&self, _command: &dyn Command, _line: &CommandLine, _outcome: &CommandOutcome) {
    }

    /// Called right before the command is undone.
    fn pre_undo(&self, _command: &dyn Command, _line: &CommandLine) {}

    /// Called right after the command was undone, whatever the outcome.
    fn post_undo(&self, _command: &dyn Command, _line: &CommandLine, _outcome: &CommandOutcome) {}
}

// ============================================================================
// Tests
// ============================================================================
