#![forbid(unsafe_code)]

//! Error types shared across the command system.
//!
//! All failures are values. Command bodies report failure through their
//! outcome strings and the manager folds each one into a [`CommandError`]
//! plus an entry in its error accumulator; nothing in this crate panics on
//! bad input.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Direction of a history traversal, carried by boundary errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    /// Stepping back towards older entries.
    Undo,
    /// Stepping forward towards newer entries.
    Redo,
}

impl std::fmt::Display for HistoryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undo => f.write_str("undo"),
            Self::Redo => f.write_str("redo"),
        }
    }
}

/// Errors produced by parsing, dispatch, execution, and history traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command line could not be tokenized.
    #[error("cannot parse command line: {0}")]
    Parse(String),

    /// No command with this name has been registered.
    #[error("command '{name}' is not registered")]
    UnknownCommand {
        /// Name as it appeared in the command line.
        name: String,
    },

    /// A command with this name (compared case-insensitively) already exists.
    #[error("a command named '{name}' is already registered")]
    DuplicateRegistration {
        /// Name of the rejected registration.
        name: String,
    },

    /// The parsed arguments do not satisfy the command's declared syntax.
    #[error("invalid arguments for command '{command}': {message}")]
    Syntax {
        /// Registered name of the command being validated.
        command: String,
        /// What was missing or malformed.
        message: String,
    },

    /// A command body reported failure while executing, undoing, or redoing.
    #[error("{0}")]
    Execution(String),

    /// Undo was requested with an empty past, or redo with an empty future.
    ///
    /// This is an expected condition rather than a fault; callers typically
    /// translate it into a disabled menu entry or a quiet no-op.
    #[error("nothing to {0}")]
    HistoryBoundary(HistoryDirection),
}
