//! Command registry.
//!
//! Built once at startup, read-only after that: concurrent handler
//! invocations look commands up without locking. Names match exactly and
//! case-sensitively; an unknown name is silently ignored upstream, which
//! lets other bots share the prefix.

use std::collections::HashMap;
use std::sync::Arc;

use crate::command::BotCommand;

/// Immutable name -> command mapping.
#[derive(Default)]
pub struct Registry {
    commands: HashMap<&'static str, Arc<dyn BotCommand>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command under its name. Startup-only; the registry is
    /// never mutated once the dispatcher is running.
    pub fn insert(&mut self, command: Arc<dyn BotCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Case-sensitive exact lookup.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn BotCommand>> {
        self.commands.get(name).cloned()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// `(name, help)` pairs, sorted by name.
    pub fn help_entries(&self) -> Vec<(&'static str, &'static str)> {
        let mut entries: Vec<_> = self
            .commands
            .values()
            .map(|c| (c.name(), c.help()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }
}
