#![forbid(unsafe_code)]

//! Commandant
//!
//! A text-command execution engine with undo/redo history, built around the
//! Command Pattern:
//!
//! - **Text front end**: every action is a parseable line like
//!   `CreateBox -name Cube -size 2.5`, so scripts, UIs, and macros share one
//!   entry point
//! - **Reversibility**: undoable commands capture their own undo state at
//!   execution time and land in a bounded history
//! - **Grouping**: several commands batch into one history entry that is
//!   undone and redone as a unit
//! - **Observability**: manager-wide and per-command observers see every
//!   execution, undo, history change, and error report
//!
//! # Architecture
//!
//! ```text
//! "CreateBox -name Cube"                  CommandManager
//!        │ parse                ┌────────────────────────────────┐
//!        ▼                      │ CommandRegistry   prototypes   │
//!   CommandLine ── lookup ────► │ CommandHistory    undo/redo    │
//!        │                      │ CallbackSet       observers    │
//!        │ clone prototype      │ errors            accumulator  │
//!        ▼                      └────────────────────────────────┘
//!   instance.execute(ctx) ── Ok + undoable ──► history entry (owns instance)
//! ```
//!
//! The registry holds one prototype per command name. Execution clones a
//! fresh instance off the prototype, runs it, and on success hands the
//! instance to the history, where it waits with its parsed line to be
//! undone or re-executed.
//!
//! # Quick Start
//!
//! ```ignore
//! use commandant::{
//!     Command, CommandContext, CommandLine, CommandManager, CommandOutcome, CommandSyntax,
//!     ParamKind,
//! };
//!
//! struct CreateBox {
//!     created: Option<String>,
//! }
//!
//! impl Command for CreateBox {
//!     fn name(&self) -> &str {
//!         "CreateBox"
//!     }
//!
//!     fn is_undoable(&self) -> bool {
//!         true
//!     }
//!
//!     fn syntax(&self) -> CommandSyntax {
//!         CommandSyntax::new().required("name", "Name of the new box.", ParamKind::String)
//!     }
//!
//!     fn execute(&mut self, _ctx: &mut CommandContext<'_>, line: &CommandLine) -> CommandOutcome {
//!         let name = line.value("name").unwrap_or_default().to_string();
//!         // ... create the object ...
//!         self.created = Some(name.clone());
//!         Ok(name)
//!     }
//!
//!     fn undo(&mut self, _ctx: &mut CommandContext<'_>, _line: &CommandLine) -> CommandOutcome {
//!         if let Some(name) = self.created.take() {
//!             // ... remove the object ...
//!         }
//!         Ok(String::new())
//!     }
//!
//!     fn clone_prototype(&self) -> Box<dyn Command> {
//!         Box::new(CreateBox { created: None })
//!     }
//! }
//!
//! let mut manager = CommandManager::new();
//! manager.register_command(Box::new(CreateBox { created: None }))?;
//!
//! manager.execute_command("CreateBox -name Cube")?;
//! manager.undo()?;
//! manager.redo()?;
//! ```
//!
//! # Module Structure
//!
//! - [`line`]: tokenizer and [`CommandLine`] parameter access
//! - [`syntax`]: declared parameters and pre-execution validation
//! - [`command`]: the [`Command`] trait and per-command observers
//! - [`group`]: [`CommandGroup`] batching
//! - [`history`]: bounded undo/redo buffer
//! - [`registry`]: name to prototype mapping
//! - [`callback`]: manager-wide observer protocol
//! - [`manager`]: the orchestrating [`CommandManager`] and the
//!   [`CommandContext`] handed to command bodies
//! - [`error`]: [`CommandError`] and the crate [`Result`]
//!
//! # Design Notes
//!
//! ## Why Prototypes
//!
//! Undo needs the exact instance that executed, with whatever state it
//! captured (previous values, created ids). Cloning a fresh instance per
//! execution keeps prototypes stateless and lets the history own each
//! executed instance outright, with no lifetime back into the registry.
//!
//! ## One Report per Transaction
//!
//! Failures accumulate in the manager instead of surfacing one by one. A
//! top-level execution clears the accumulator on entry and flushes it to
//! error-report observers on exit, so a group that fails three members
//! produces a single report with three messages. Nested executions made by
//! a running command only append.
//!
//! ## Why Bodies Get a Context
//!
//! Macro commands run other commands from inside their own `execute` and
//! `undo`. The bodies therefore receive a [`CommandContext`], which borrows
//! the registry, the observers, and the error accumulator while the history
//! stays with the manager. Nested execution works at any depth, and the
//! buffer that may own the running instance is out of reach by
//! construction.
//!
//! ## An Explicit Manager
//!
//! There is no global instance. Embedders own as many managers as they
//! want; tests run them side by side without interference.

pub mod callback;
pub mod command;
pub mod error;
pub mod group;
pub mod history;
pub mod line;
pub mod manager;
pub mod registry;
pub mod syntax;

// Re-export commonly used types
pub use callback::{CallbackSet, ManagerCallback};
pub use command::{Command, CommandCallback, CommandOutcome};
pub use error::{CommandError, HistoryDirection, Result};
pub use group::CommandGroup;
pub use history::{CommandHistory, HistoryAction, HistoryEntry};
pub use line::CommandLine;
pub use manager::{CommandContext, CommandManager, ExecOptions, Execution, ManagerConfig};
pub use registry::CommandRegistry;
pub use syntax::{CommandSyntax, ParamKind, ParamSpec};
