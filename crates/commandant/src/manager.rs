#![forbid(unsafe_code)]

//! The command manager: execution, undo/redo, groups, and error reporting.
//!
//! [`CommandManager`] owns the registry of command prototypes, the bounded
//! history, the manager-wide observer set, and the error accumulator. It is
//! an explicit value with no global state; several managers can coexist in
//! one process.
//!
//! # Execution walk
//!
//! A top-level [`CommandManager::execute_command`] call runs through:
//!
//! 1. tokenize the text into a [`CommandLine`] (malformed input is reported
//!    like any other failure),
//! 2. look the command name up and clone a fresh instance off its
//!    prototype,
//! 3. clear the error accumulator when the options ask for it,
//! 4. validate the line against the command's declared syntax,
//! 5. notify pre-execute observers, run the body, notify post-execute
//!    observers,
//! 6. on success push a history entry when the command is undoable and
//!    recording is on (discarding the redo tail first),
//! 7. flush the accumulator to error-report observers.
//!
//! Command bodies receive a [`CommandContext`], the manager with the
//! history split off, and run nested commands through it. Nested calls use
//! [`ExecOptions::inside_command`]: they never touch the history and they
//! append to the accumulator without clearing or flushing it, so all errors
//! of one top-level transaction surface in a single report.
//!
//! # Groups
//!
//! [`CommandManager::execute_group`] feeds every member through the
//! single-command path without individual recording, then pushes the whole
//! group as one entry once every member succeeded. A member failure aborts
//! the rest of the group unless the group says otherwise; members that
//! already ran stay applied either way.
//!
//! # Invariants
//!
//! - A failed execution never mutates the history.
//! - Undo keeps the entry and moves the cursor back; redo re-executes the
//!   entry past the cursor. Boundary misses are quiet
//!   [`CommandError::HistoryBoundary`] values.
//! - Observer passes iterate a snapshot taken immediately before the pass.

use crate::callback::{CallbackSet, ManagerCallback};
use crate::command::{Command, CommandCallback};
use crate::error::{CommandError, HistoryDirection, Result};
use crate::group::CommandGroup;
use crate::history::{CommandHistory, HistoryAction};
use crate::line::CommandLine;
use crate::registry::CommandRegistry;
use std::fmt;
use std::sync::Arc;

/// Initial manager settings.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// History capacity. The oldest entry is evicted beyond this.
    pub max_history_items: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_history_items: 100,
        }
    }
}

impl ManagerConfig {
    /// Configuration with a custom history capacity.
    #[must_use]
    pub fn new(max_history_items: usize) -> Self {
        Self { max_history_items }
    }
}

/// Per-call execution switches.
#[derive(Debug, Clone, Copy)]
pub struct ExecOptions {
    /// Record a successful, undoable execution in the history.
    pub add_to_history: bool,
    /// The call happens on behalf of an already-running command. Nested
    /// calls never record history and never clear or flush the error
    /// accumulator.
    pub nested: bool,
    /// Clear the error accumulator before executing (top-level calls only).
    pub clear_errors: bool,
    /// Flush the accumulator to error-report observers when done
    /// (top-level calls only).
    pub report_errors: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            add_to_history: true,
            nested: false,
            clear_errors: true,
            report_errors: true,
        }
    }
}

impl ExecOptions {
    /// Options for a call made from inside a running command.
    #[must_use]
    pub fn inside_command() -> Self {
        Self {
            add_to_history: false,
            nested: true,
            clear_errors: false,
            report_errors: false,
        }
    }

    /// Execute without recording, keeping the other defaults.
    #[must_use]
    pub fn without_history(mut self) -> Self {
        self.add_to_history = false;
        self
    }

    /// Keep previously accumulated errors.
    #[must_use]
    pub fn keep_errors(mut self) -> Self {
        self.clear_errors = false;
        self
    }

    /// Do not flush the accumulator when done.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.report_errors = false;
        self
    }
}

/// What a successful execution produced.
#[derive(Debug, Clone)]
pub struct Execution {
    /// Registered name of the executed command, or the group name.
    pub command: String,
    /// Result text returned by the command body; for groups, the last
    /// member's.
    pub output: String,
    /// The parsed argument line. `None` for group executions.
    pub line: Option<CommandLine>,
    /// Item number assigned when the execution was recorded for undo.
    pub history_item: Option<u64>,
}

/// The execution surface command bodies see.
///
/// Borrows the manager's registry, observer set, and error accumulator
/// while the history stays behind with the manager. A body can therefore
/// run nested commands at any depth, during execute, undo, and redo alike,
/// but can never reach the history entry that may own the very instance
/// being run.
pub struct CommandContext<'a> {
    registry: &'a CommandRegistry,
    callbacks: &'a CallbackSet,
    errors: &'a mut Vec<String>,
}

impl fmt::Debug for CommandContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("commands", &self.registry.len())
            .field("callbacks", &self.callbacks.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}

impl CommandContext<'_> {
    /// Execute a command string on behalf of the running command.
    ///
    /// The nested execution is never recorded for undo and the accumulator
    /// is neither cleared nor flushed, so failures surface in the report of
    /// the enclosing top-level call.
    ///
    /// # Errors
    ///
    /// Any [`CommandError`] of the single-command path.
    pub fn execute_inside_command(&mut self, text: &str) -> Result<Execution> {
        let opts = ExecOptions::inside_command();
        let (command, line, output) = self.execute_text_core(text, &opts, None)?;
        Ok(Execution {
            command: command.name().to_string(),
            output,
            line: Some(line),
            history_item: None,
        })
    }

    /// Execute a group on behalf of the running command.
    ///
    /// Members run nested, nothing is recorded, and failures stay in the
    /// accumulator for the enclosing top-level call to report.
    ///
    /// # Errors
    ///
    /// The last member failure.
    pub fn execute_group_inside_command(&mut self, group: CommandGroup) -> Result<Execution> {
        let (group, outcome) = self.execute_group_core(group);
        let output = outcome?;
        Ok(Execution {
            command: group.name().to_string(),
            output,
            line: None,
            history_item: None,
        })
    }

    /// Append a message to the enclosing transaction's error report without
    /// failing the running command.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Record a failure, flushing the report for top-level calls.
    fn fail(&mut self, err: CommandError, opts: &ExecOptions) -> CommandError {
        tracing::warn!(target: "commandant.exec", error = %err, "command failed");
        self.errors.push(err.to_string());
        if opts.report_errors && !opts.nested {
            self.report();
        }
        err
    }

    /// Flush the accumulator to error-report observers. Returns whether
    /// anything was reported.
    fn report(&mut self) -> bool {
        if self.errors.is_empty() {
            return false;
        }
        let errors = std::mem::take(self.errors);
        tracing::warn!(
            target: "commandant.errors",
            count = errors.len(),
            "reporting command errors"
        );
        for cb in self.callbacks.snapshot() {
            cb.on_error_report(&errors);
        }
        true
    }

    /// Parse, look up, validate, and run one command body, firing observer
    /// passes around it. Returns the executed instance so the caller can
    /// record it (history entry or group member) or drop it.
    fn execute_text_core(
        &mut self,
        text: &str,
        opts: &ExecOptions,
        group: Option<&CommandGroup>,
    ) -> Result<(Box<dyn Command>, CommandLine, String)> {
        let line = match CommandLine::parse(text) {
            Ok(line) => line,
            Err(err) => return Err(self.fail(err, opts)),
        };
        let Some(mut command) = self.registry.instantiate(line.name()) else {
            let err = CommandError::UnknownCommand {
                name: line.name().to_string(),
            };
            return Err(self.fail(err, opts));
        };
        if opts.clear_errors && !opts.nested {
            self.errors.clear();
        }
        if let Err(message) = command.syntax().validate(&line) {
            let err = CommandError::Syntax {
                command: command.name().to_string(),
                message,
            };
            return Err(self.fail(err, opts));
        }

        tracing::debug!(
            target: "commandant.exec",
            command = %command.name(),
            nested = opts.nested,
            "executing command"
        );

        let command_cbs = self.registry.callbacks_snapshot(command.name());
        for cb in self.callbacks.snapshot() {
            cb.on_pre_execute(group, command.as_ref(), &line);
        }
        for cb in &command_cbs {
            cb.pre_execute(command.as_ref(), &line);
        }

        let outcome = command.execute(self, &line);

        for cb in self.callbacks.snapshot() {
            cb.on_post_execute(group, command.as_ref(), &line, &outcome);
        }
        for cb in &command_cbs {
            cb.post_execute(command.as_ref(), &line, &outcome);
        }

        match outcome {
            Ok(output) => Ok((command, line, output)),
            Err(message) => {
                let message = if message.is_empty() {
                    format!("command '{}' failed", command.name())
                } else {
                    message
                };
                Err(self.fail(CommandError::Execution(message), opts))
            }
        }
    }

    /// Run every group member through the single-command path with nested
    /// options, recording executed instances into the group. Returns the
    /// group together with the last output or the failure.
    fn execute_group_core(&mut self, mut group: CommandGroup) -> (CommandGroup, Result<String>) {
        tracing::debug!(
            target: "commandant.exec",
            group = %group.name(),
            members = group.len(),
            "executing command group"
        );
        for cb in self.callbacks.snapshot() {
            cb.on_pre_execute_group(&group, false);
        }

        let member_opts = ExecOptions::inside_command();
        let mut failure: Option<CommandError> = None;
        let mut last_output = String::new();
        for index in 0..group.len() {
            let Some(text) = group.command_text(index) else {
                break;
            };
            match self.execute_text_core(text, &member_opts, Some(&group)) {
                Ok((command, line, output)) => {
                    group.record_executed(command, line);
                    last_output = output;
                }
                Err(err) => {
                    failure = Some(err);
                    if !group.continue_after_error() {
                        break;
                    }
                }
            }
        }

        let succeeded = failure.is_none();
        for cb in self.callbacks.snapshot() {
            cb.on_post_execute_group(&group, succeeded);
        }

        let result = match failure {
            None => Ok(last_output),
            Some(err) => {
                tracing::warn!(
                    target: "commandant.exec",
                    group = %group.name(),
                    applied = group.num_executed(),
                    error = %err,
                    "command group failed"
                );
                Err(err)
            }
        };
        (group, result)
    }
}

/// Registry, history, observers, and error accumulator in one value.
pub struct CommandManager {
    registry: CommandRegistry,
    history: CommandHistory,
    callbacks: CallbackSet,
    errors: Vec<String>,
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("commands", &self.registry.len())
            .field("history_len", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("callbacks", &self.callbacks.len())
            .field("errors", &self.errors.len())
            .finish()
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandManager {
    /// Manager with the default configuration (history capacity 100).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Manager with explicit settings.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            registry: CommandRegistry::new(),
            history: CommandHistory::new(config.max_history_items),
            callbacks: CallbackSet::new(),
            errors: Vec::new(),
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a command prototype.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::DuplicateRegistration`] when the
    /// case-insensitive name is taken. The rejected box is dropped.
    pub fn register_command(&mut self, command: Box<dyn Command>) -> Result<()> {
        let name = command.name().to_string();
        self.registry.register(command)?;
        tracing::debug!(target: "commandant.registry", command = %name, "command registered");
        Ok(())
    }

    /// Number of registered commands.
    #[must_use]
    pub fn num_commands(&self) -> usize {
        self.registry.len()
    }

    /// The registered prototype at `index`, in registration order.
    #[must_use]
    pub fn command_at(&self, index: usize) -> Option<&dyn Command> {
        self.registry.command_at(index)
    }

    /// Look a prototype up by case-insensitive name.
    #[must_use]
    pub fn find_command(&self, name: &str) -> Option<&dyn Command> {
        self.registry.find(name)
    }

    /// Whether a command with this name is registered.
    #[must_use]
    pub fn contains_command(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    // ========================================================================
    // Per-command observers
    // ========================================================================

    /// Attach an observer to one named command.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for unregistered names.
    pub fn register_command_callback(
        &mut self,
        name: &str,
        callback: Arc<dyn CommandCallback>,
    ) -> Result<()> {
        self.registry.add_callback(name, callback)
    }

    /// Detach an observer from one named command. Returns whether anything
    /// was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for unregistered names.
    pub fn remove_command_callback(
        &mut self,
        name: &str,
        callback: &Arc<dyn CommandCallback>,
    ) -> Result<bool> {
        self.registry.remove_callback(name, callback)
    }

    /// Detach an observer from every command it is attached to. Returns the
    /// number of attachments removed.
    pub fn remove_command_callback_everywhere(
        &mut self,
        callback: &Arc<dyn CommandCallback>,
    ) -> usize {
        self.registry.remove_callback_everywhere(callback)
    }

    /// Number of observers attached to the named command.
    #[must_use]
    pub fn num_command_callbacks(&self, name: &str) -> usize {
        self.registry.num_callbacks(name)
    }

    // ========================================================================
    // Manager observers
    // ========================================================================

    /// Attach a manager-wide observer.
    pub fn register_callback(&mut self, callback: Arc<dyn ManagerCallback>) {
        self.callbacks.add(callback);
    }

    /// Detach a manager-wide observer by handle identity.
    pub fn remove_callback(&mut self, callback: &Arc<dyn ManagerCallback>) -> bool {
        self.callbacks.remove(callback)
    }

    /// Detach every manager-wide observer.
    pub fn remove_callbacks(&mut self) {
        self.callbacks.clear();
    }

    /// Number of manager-wide observers.
    #[must_use]
    pub fn num_callbacks(&self) -> usize {
        self.callbacks.len()
    }

    /// The manager-wide observer at `index`.
    #[must_use]
    pub fn callback(&self, index: usize) -> Option<&Arc<dyn ManagerCallback>> {
        self.callbacks.get(index)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Execute a command string with default options: recorded when
    /// undoable, accumulator cleared first, errors reported at the end.
    ///
    /// # Errors
    ///
    /// Any [`CommandError`]; the same failure is also appended to the
    /// accumulator and flushed to error-report observers.
    pub fn execute_command(&mut self, text: &str) -> Result<Execution> {
        self.execute_command_with(text, ExecOptions::default())
    }

    /// Execute a command string on behalf of a running command: no history
    /// entry, accumulator untouched except for appends.
    ///
    /// # Errors
    ///
    /// Any [`CommandError`]; the failure stays in the accumulator for the
    /// enclosing top-level call to report.
    pub fn execute_inside_command(&mut self, text: &str) -> Result<Execution> {
        self.execute_command_with(text, ExecOptions::inside_command())
    }

    /// Execute a command string with explicit options.
    ///
    /// # Errors
    ///
    /// Any [`CommandError`], handled according to the options.
    pub fn execute_command_with(&mut self, text: &str, opts: ExecOptions) -> Result<Execution> {
        let (command, line, output) = self.context().execute_text_core(text, &opts, None)?;
        let name = command.name().to_string();
        let history_item = if opts.add_to_history && !opts.nested && command.is_undoable() {
            Some(self.push_history(HistoryAction::Single {
                command,
                line: line.clone(),
            }))
        } else {
            None
        };
        if opts.report_errors && !opts.nested {
            self.report_errors();
        }
        Ok(Execution {
            command: name,
            output,
            line: Some(line),
            history_item,
        })
    }

    /// Execute a group with default options.
    ///
    /// Members run in order through the single-command path. When all of
    /// them succeed and the group is undoable, the whole group becomes one
    /// history entry. A member failure aborts the remaining members unless
    /// [`CommandGroup::set_continue_after_error`] was set; members that
    /// already ran are not rolled back.
    ///
    /// # Errors
    ///
    /// The last member failure, after all error handling ran.
    pub fn execute_group(&mut self, group: CommandGroup) -> Result<Execution> {
        self.execute_group_with(group, ExecOptions::default())
    }

    /// Execute a group on behalf of a running command.
    ///
    /// # Errors
    ///
    /// The last member failure; the accumulator keeps all of them for the
    /// enclosing top-level call.
    pub fn execute_group_inside_command(&mut self, group: CommandGroup) -> Result<Execution> {
        self.execute_group_with(group, ExecOptions::inside_command())
    }

    /// Execute a group with explicit options.
    ///
    /// # Errors
    ///
    /// The last member failure, handled according to the options.
    pub fn execute_group_with(&mut self, group: CommandGroup, opts: ExecOptions) -> Result<Execution> {
        if opts.clear_errors && !opts.nested {
            self.errors.clear();
        }
        let (group, outcome) = self.context().execute_group_core(group);
        let result = match outcome {
            Ok(output) => {
                let name = group.name().to_string();
                let history_item = if opts.add_to_history
                    && !opts.nested
                    && group.is_undoable()
                    && group.num_executed() > 0
                {
                    Some(self.push_history(HistoryAction::Group(group)))
                } else {
                    None
                };
                Ok(Execution {
                    command: name,
                    output,
                    line: None,
                    history_item,
                })
            }
            Err(err) => Err(err),
        };
        if opts.report_errors && !opts.nested {
            self.report_errors();
        }
        result
    }

    /// The execution surface command bodies receive.
    ///
    /// Borrowing it locks the manager for as long as the context lives.
    /// Useful for driving a command instance outside the manager, as unit
    /// tests of command implementations do.
    #[must_use]
    pub fn context(&mut self) -> CommandContext<'_> {
        CommandContext {
            registry: &self.registry,
            callbacks: &self.callbacks,
            errors: &mut self.errors,
        }
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Whether an undo target exists.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo target exists.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Undo the entry under the cursor.
    ///
    /// Groups revert their members in reverse execution order; every member
    /// is attempted even after one fails. On success the cursor moves one
    /// entry back; on failure it stays, and the entry remains eligible for
    /// another attempt.
    ///
    /// # Errors
    ///
    /// [`CommandError::HistoryBoundary`] when everything is already undone,
    /// or [`CommandError::Execution`] when a command body refuses.
    pub fn undo(&mut self) -> Result<String> {
        let Some(index) = self.history.cursor() else {
            tracing::debug!(target: "commandant.history", "nothing to undo");
            return Err(CommandError::HistoryBoundary(HistoryDirection::Undo));
        };
        match self.revert_entry(index) {
            Ok(output) => {
                self.history.step_back();
                let cursor = self.history.cursor();
                for cb in self.callbacks.snapshot() {
                    cb.on_cursor_moved(cursor);
                }
                tracing::debug!(target: "commandant.history", cursor = ?cursor, "undo succeeded");
                self.report_errors();
                Ok(output)
            }
            Err(err) => {
                self.report_errors();
                Err(err)
            }
        }
    }

    /// Redo the entry after the cursor by re-executing it.
    ///
    /// Group members re-run in forward order with the usual abort
    /// semantics. On success the cursor moves one entry forward.
    ///
    /// # Errors
    ///
    /// [`CommandError::HistoryBoundary`] when nothing was undone, or
    /// [`CommandError::Execution`] when a command body fails.
    pub fn redo(&mut self) -> Result<String> {
        let Some(index) = self.history.redo_target() else {
            tracing::debug!(target: "commandant.history", "nothing to redo");
            return Err(CommandError::HistoryBoundary(HistoryDirection::Redo));
        };
        match self.replay_entry(index) {
            Ok(output) => {
                self.history.step_forward();
                let cursor = self.history.cursor();
                for cb in self.callbacks.snapshot() {
                    cb.on_cursor_moved(cursor);
                }
                tracing::debug!(target: "commandant.history", cursor = ?cursor, "redo succeeded");
                self.report_errors();
                Ok(output)
            }
            Err(err) => {
                self.report_errors();
                Err(err)
            }
        }
    }

    // ========================================================================
    // History surface
    // ========================================================================

    /// Read access to the history buffer.
    #[must_use]
    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Configured history capacity.
    #[must_use]
    pub fn max_history_items(&self) -> usize {
        self.history.max_items()
    }

    /// Change the history capacity, evicting oldest entries as needed.
    /// Capacity is clamped to at least one entry.
    pub fn set_max_history_items(&mut self, max_items: usize) {
        let cursor_before = self.history.cursor();
        let removed = self.history.set_max_items(max_items);
        for index in removed {
            for cb in self.callbacks.snapshot() {
                cb.on_history_removed(index);
            }
        }
        let cursor = self.history.cursor();
        if cursor != cursor_before {
            for cb in self.callbacks.snapshot() {
                cb.on_cursor_moved(cursor);
            }
        }
        tracing::debug!(
            target: "commandant.history",
            max_items = self.history.max_items(),
            len = self.history.len(),
            "history capacity changed"
        );
    }

    /// Drop every history entry. Item numbering keeps rising.
    pub fn clear_history(&mut self) {
        let had_cursor = self.history.cursor().is_some();
        self.history.clear();
        if had_cursor {
            for cb in self.callbacks.snapshot() {
                cb.on_cursor_moved(None);
            }
        }
        tracing::debug!(target: "commandant.history", "history cleared");
    }

    /// Dump the history through `tracing` at info level, one line per
    /// entry, marking the cursor position.
    pub fn log_history(&self) {
        tracing::info!(
            target: "commandant.history",
            len = self.history.len(),
            max_items = self.history.max_items(),
            cursor = ?self.history.cursor(),
            "command history"
        );
        for (index, entry) in self.history.iter().enumerate() {
            let marker = if Some(index) == self.history.cursor() {
                "->"
            } else {
                "  "
            };
            tracing::info!(target: "commandant.history", index, "{marker} {}", entry.label());
        }
    }

    // ========================================================================
    // Error accumulator
    // ========================================================================

    /// Append a message to the error accumulator without reporting it.
    ///
    /// For failures produced between commands; running command bodies use
    /// [`CommandContext::add_error`] instead.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Currently accumulated, not yet reported error messages.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Drop accumulated errors without reporting them.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Flush the accumulator to error-report observers and clear it.
    /// Returns whether there was anything to report.
    pub fn report_errors(&mut self) -> bool {
        self.context().report()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Push an entry and notify removal, push, and cursor observers.
    fn push_history(&mut self, action: HistoryAction) -> u64 {
        let report = self.history.push(action);
        for index in &report.removed_indices {
            for cb in self.callbacks.snapshot() {
                cb.on_history_removed(*index);
            }
        }
        if let Some(entry) = self.history.entry(report.index) {
            for cb in self.callbacks.snapshot() {
                cb.on_history_pushed(report.index, entry);
            }
        }
        let cursor = self.history.cursor();
        for cb in self.callbacks.snapshot() {
            cb.on_cursor_moved(cursor);
        }
        tracing::debug!(
            target: "commandant.history",
            item_nr = report.item_nr,
            index = report.index,
            len = self.history.len(),
            "history entry pushed"
        );
        report.item_nr
    }

    /// Undo the entry at `index`, firing undo observers. Does not move the
    /// cursor.
    ///
    /// The context borrows the non-history fields while the entry borrows
    /// the history, so undo bodies get the same nested-execution surface as
    /// execute bodies.
    fn revert_entry(&mut self, index: usize) -> Result<String> {
        let Some(entry) = self.history.entry_mut(index) else {
            return Err(CommandError::HistoryBoundary(HistoryDirection::Undo));
        };
        let item_nr = entry.item_nr();
        tracing::debug!(
            target: "commandant.history",
            item_nr,
            name = %entry.name(),
            "undoing history entry"
        );
        let mut ctx = CommandContext {
            registry: &self.registry,
            callbacks: &self.callbacks,
            errors: &mut self.errors,
        };
        match entry.action_mut() {
            HistoryAction::Single { command, line } => {
                for cb in ctx.callbacks.snapshot() {
                    cb.on_pre_undo(command.as_ref(), line);
                }
                let command_cbs = ctx.registry.callbacks_snapshot(command.name());
                for cb in &command_cbs {
                    cb.pre_undo(command.as_ref(), line);
                }
                let outcome = command.undo(&mut ctx, line);
                for cb in &command_cbs {
                    cb.post_undo(command.as_ref(), line, &outcome);
                }
                for cb in ctx.callbacks.snapshot() {
                    cb.on_post_undo(command.as_ref(), line);
                }
                match outcome {
                    Ok(output) => Ok(output),
                    Err(message) => {
                        let message = if message.is_empty() {
                            format!("cannot undo command '{}'", command.name())
                        } else {
                            message
                        };
                        ctx.errors.push(message.clone());
                        tracing::warn!(
                            target: "commandant.history",
                            item_nr,
                            error = %message,
                            "undo failed"
                        );
                        Err(CommandError::Execution(message))
                    }
                }
            }
            HistoryAction::Group(group) => {
                for cb in ctx.callbacks.snapshot() {
                    cb.on_pre_execute_group(group, true);
                }
                let mut first_failure: Option<String> = None;
                for (command, line) in group.executed_mut().iter_mut().rev() {
                    for cb in ctx.callbacks.snapshot() {
                        cb.on_pre_undo(command.as_ref(), line);
                    }
                    let command_cbs = ctx.registry.callbacks_snapshot(command.name());
                    for cb in &command_cbs {
                        cb.pre_undo(command.as_ref(), line);
                    }
                    let outcome = command.undo(&mut ctx, line);
                    for cb in &command_cbs {
                        cb.post_undo(command.as_ref(), line, &outcome);
                    }
                    for cb in ctx.callbacks.snapshot() {
                        cb.on_post_undo(command.as_ref(), line);
                    }
                    if let Err(message) = outcome {
                        let message = if message.is_empty() {
                            format!("cannot undo command '{}'", command.name())
                        } else {
                            message
                        };
                        ctx.errors.push(message.clone());
                        if first_failure.is_none() {
                            first_failure = Some(message);
                        }
                    }
                }
                let succeeded = first_failure.is_none();
                for cb in ctx.callbacks.snapshot() {
                    cb.on_post_execute_group(group, succeeded);
                }
                match first_failure {
                    None => Ok(String::new()),
                    Some(message) => {
                        tracing::warn!(
                            target: "commandant.history",
                            item_nr,
                            error = %message,
                            "group undo failed"
                        );
                        Err(CommandError::Execution(message))
                    }
                }
            }
        }
    }

    /// Re-execute the entry at `index`, firing execute observers. Does not
    /// move the cursor.
    fn replay_entry(&mut self, index: usize) -> Result<String> {
        let Some(entry) = self.history.entry_mut(index) else {
            return Err(CommandError::HistoryBoundary(HistoryDirection::Redo));
        };
        let item_nr = entry.item_nr();
        tracing::debug!(
            target: "commandant.history",
            item_nr,
            name = %entry.name(),
            "redoing history entry"
        );
        let mut ctx = CommandContext {
            registry: &self.registry,
            callbacks: &self.callbacks,
            errors: &mut self.errors,
        };
        match entry.action_mut() {
            HistoryAction::Single { command, line } => {
                let command_cbs = ctx.registry.callbacks_snapshot(command.name());
                for cb in ctx.callbacks.snapshot() {
                    cb.on_pre_execute(None, command.as_ref(), line);
                }
                for cb in &command_cbs {
                    cb.pre_execute(command.as_ref(), line);
                }
                let outcome = command.execute(&mut ctx, line);
                for cb in ctx.callbacks.snapshot() {
                    cb.on_post_execute(None, command.as_ref(), line, &outcome);
                }
                for cb in &command_cbs {
                    cb.post_execute(command.as_ref(), line, &outcome);
                }
                match outcome {
                    Ok(output) => Ok(output),
                    Err(message) => {
                        let message = if message.is_empty() {
                            format!("cannot redo command '{}'", command.name())
                        } else {
                            message
                        };
                        ctx.errors.push(message.clone());
                        tracing::warn!(
                            target: "commandant.history",
                            item_nr,
                            error = %message,
                            "redo failed"
                        );
                        Err(CommandError::Execution(message))
                    }
                }
            }
            HistoryAction::Group(group) => {
                for cb in ctx.callbacks.snapshot() {
                    cb.on_pre_execute_group(group, false);
                }
                let mut executed = group.take_executed();
                let mut failure: Option<String> = None;
                let mut last_output = String::new();
                for (command, line) in executed.iter_mut() {
                    let command_cbs = ctx.registry.callbacks_snapshot(command.name());
                    for cb in ctx.callbacks.snapshot() {
                        cb.on_pre_execute(Some(&*group), command.as_ref(), line);
                    }
                    for cb in &command_cbs {
                        cb.pre_execute(command.as_ref(), line);
                    }
                    let outcome = command.execute(&mut ctx, line);
                    for cb in ctx.callbacks.snapshot() {
                        cb.on_post_execute(Some(&*group), command.as_ref(), line, &outcome);
                    }
                    for cb in &command_cbs {
                        cb.post_execute(command.as_ref(), line, &outcome);
                    }
                    match outcome {
                        Ok(output) => last_output = output,
                        Err(message) => {
                            let message = if message.is_empty() {
                                format!("command '{}' failed", command.name())
                            } else {
                                message
                            };
                            ctx.errors.push(message.clone());
                            failure = Some(message);
                            if !group.continue_after_error() {
                                break;
                            }
                        }
                    }
                }
                group.restore_executed(executed);
                let succeeded = failure.is_none();
                for cb in ctx.callbacks.snapshot() {
                    cb.on_post_execute_group(group, succeeded);
                }
                match failure {
                    None => Ok(last_output),
                    Some(message) => {
                        tracing::warn!(
                            target: "commandant.history",
                            item_nr,
                            error = %message,
                            "group redo failed"
                        );
                        Err(CommandError::Execution(message))
                    }
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
