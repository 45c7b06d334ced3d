#![forbid(unsafe_code)]

//! Command prototype registration and lookup.
//!
//! The registry owns one prototype per command name for the lifetime of the
//! manager. Names are unique case-insensitively; the registration order is
//! preserved for enumeration. Per-command observers attach here so that
//! every execution, undo, and redo of a command reaches them, wherever it
//! was triggered from.

use crate::command::{Command, CommandCallback};
use crate::error::{CommandError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

struct RegistryEntry {
    prototype: Box<dyn Command>,
    callbacks: Vec<Arc<dyn CommandCallback>>,
}

/// Name-to-prototype map with per-command observers.
#[derive(Default)]
pub struct CommandRegistry {
    /// Lowercased name to index into `entries`.
    by_name: HashMap<String, usize>,
    /// Entries in registration order. Never removed, so indices are stable.
    entries: Vec<RegistryEntry>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.entries.len())
            .finish()
    }
}

impl CommandRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command prototype.
    ///
    /// The registry takes ownership either way; a rejected duplicate is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::DuplicateRegistration`] when a command with
    /// the same case-insensitive name already exists.
    pub fn register(&mut self, command: Box<dyn Command>) -> Result<()> {
        let name = command.name().to_string();
        let key = name.to_ascii_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(CommandError::DuplicateRegistration { name });
        }
        self.by_name.insert(key, self.entries.len());
        self.entries.push(RegistryEntry {
            prototype: command,
            callbacks: Vec::new(),
        });
        Ok(())
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a command with this name exists (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(&name.to_ascii_lowercase())
    }

    /// Look up a prototype by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&dyn Command> {
        let index = *self.by_name.get(&name.to_ascii_lowercase())?;
        self.entries.get(index).map(|e| e.prototype.as_ref())
    }

    /// The prototype at `index`, in registration order.
    #[must_use]
    pub fn command_at(&self, index: usize) -> Option<&dyn Command> {
        self.entries.get(index).map(|e| e.prototype.as_ref())
    }

    /// Iterate prototypes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.entries.iter().map(|e| e.prototype.as_ref())
    }

    /// Clone a fresh instance of the named command for one execution.
    #[must_use]
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Command>> {
        self.find(name).map(Command::clone_prototype)
    }

    /// Attach an observer to the named command.
    ///
    /// The same handle may be attached more than once; it is then notified
    /// once per attachment.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for unregistered names.
    pub fn add_callback(&mut self, name: &str, callback: Arc<dyn CommandCallback>) -> Result<()> {
        let entry = self.entry_mut(name)?;
        entry.callbacks.push(callback);
        Ok(())
    }

    /// Detach an observer from the named command, by handle identity.
    /// Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for unregistered names.
    pub fn remove_callback(
        &mut self,
        name: &str,
        callback: &Arc<dyn CommandCallback>,
    ) -> Result<bool> {
        let entry = self.entry_mut(name)?;
        let before = entry.callbacks.len();
        entry.callbacks.retain(|existing| !Arc::ptr_eq(existing, callback));
        Ok(entry.callbacks.len() != before)
    }

    /// Detach an observer from every command it is attached to. Returns the
    /// number of attachments removed.
    pub fn remove_callback_everywhere(&mut self, callback: &Arc<dyn CommandCallback>) -> usize {
        let mut removed = 0;
        for entry in &mut self.entries {
            let before = entry.callbacks.len();
            entry.callbacks.retain(|existing| !Arc::ptr_eq(existing, callback));
            removed += before - entry.callbacks.len();
        }
        removed
    }

    /// Number of observers attached to the named command.
    #[must_use]
    pub fn num_callbacks(&self, name: &str) -> usize {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .and_then(|&index| self.entries.get(index))
            .map_or(0, |e| e.callbacks.len())
    }

    /// Snapshot of the named command's observers, empty for unknown names.
    pub(crate) fn callbacks_snapshot(&self, name: &str) -> Vec<Arc<dyn CommandCallback>> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .and_then(|&index| self.entries.get(index))
            .map_or_else(Vec::new, |e| e.callbacks.clone())
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut RegistryEntry> {
        let index = *self.by_name.get(&name.to_ascii_lowercase()).ok_or_else(|| {
            CommandError::UnknownCommand {
                name: name.to_string(),
            }
        })?;
        self.entries
            .get_mut(index)
            .ok_or_else(|| CommandError::UnknownCommand {
                name: name.to_string(),
            })
    }
}

// ============================================================================
// Tests
// ============================================================================
