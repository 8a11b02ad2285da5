//! Slash commands.
//!
//! Input starting with `/` is routed to a [`Command`] by name instead of the
//! model. Commands act on the agent only through the capability traits in
//! [`crate::agent::capabilities`], and answer with a [`CommandOutcome`].
//!
//! ```ignore
//! let registry = CommandRegistry::with_defaults();
//! match registry.execute("/task write tests", &mut agent) {
//!     None => { /* not a command, send to the model */ }
//!     Some(Ok(CommandOutcome::Reply(text))) => println!("{text}"),
//!     Some(Ok(CommandOutcome::Exit)) => return,
//!     Some(Err(e)) => eprintln!("{e}"),
//! }
//! ```

pub mod conversation;
pub mod workspace;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::agent::CommandTarget;

pub use conversation::{
    ClearCommand, ExitCommand, HelpCommand, KNOWN_MODELS, ModelCommand, StatsCommand,
    VerboseCommand,
};
pub use workspace::{
    BookmarkCommand, ContextCommand, FocusCommand, TaskCommand, WorkspaceCommand,
};

/// What a command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Text to show the user.
    Reply(String),
    /// The user asked to leave.
    Exit,
}

impl CommandOutcome {
    pub fn reply(text: impl Into<String>) -> Self {
        CommandOutcome::Reply(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("/{0} takes no arguments")]
    UnexpectedArguments(String),
    #[error("{0}")]
    InvalidArgument(String),
}

/// Help grouping. Variants are listed in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CommandCategory {
    Session,
    Context,
    Model,
    System,
}

impl CommandCategory {
    pub const ALL: [CommandCategory; 4] = [
        CommandCategory::Session,
        CommandCategory::Context,
        CommandCategory::Model,
        CommandCategory::System,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            CommandCategory::Session => "Chat & Session Management",
            CommandCategory::Context => "Context & Focus",
            CommandCategory::Model => "Model Control",
            CommandCategory::System => "System Information",
        }
    }
}

/// Everything a command can reach while it runs.
pub struct CommandContext<'a> {
    pub target: &'a mut dyn CommandTarget,
    pub registry: &'a CommandRegistry,
}

/// A slash command.
pub trait Command: Send + Sync {
    /// Name without the leading `/`.
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn usage(&self) -> &'static str;

    fn category(&self) -> CommandCategory {
        CommandCategory::System
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError>;
}

/// Fail with [`CommandError::UnexpectedArguments`] when `args` is non-empty.
pub(crate) fn no_arguments(command: &dyn Command, args: &[&str]) -> Result<(), CommandError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandError::UnexpectedArguments(command.name().to_string()))
    }
}

// ── Registry ───────────────────────────────────────────────────────

/// Name-indexed command table.
///
/// Registration and lookup may happen concurrently from several threads.
/// The lock is released before a command runs.
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<HashMap<String, Arc<dyn Command>>>,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&'static str> = self.list().iter().map(|c| c.name()).collect();
        f.debug_struct("CommandRegistry").field("commands", &names).finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in command.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(ClearCommand);
        registry.register(ContextCommand);
        registry.register(FocusCommand);
        registry.register(TaskCommand);
        registry.register(StatsCommand);
        registry.register(BookmarkCommand);
        registry.register(WorkspaceCommand);
        registry.register(ModelCommand);
        registry.register(VerboseCommand);
        registry.register(HelpCommand);
        registry.register(ExitCommand);
        registry
    }

    /// Add a command, replacing any command with the same name.
    pub fn register(&self, command: impl Command + 'static) {
        let mut commands = self.commands.write().unwrap_or_else(PoisonError::into_inner);
        commands.insert(command.name().to_string(), Arc::new(command));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// All commands, sorted by name.
    pub fn list(&self) -> Vec<Arc<dyn Command>> {
        let mut commands: Vec<Arc<dyn Command>> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        commands.sort_by_key(|c| c.name());
        commands
    }

    pub fn len(&self) -> usize {
        self.commands.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `input` as a slash command.
    ///
    /// Returns `None` when the input is not a command (no leading `/`), so
    /// the caller can send it to the model instead.
    pub fn execute(
        &self,
        input: &str,
        target: &mut dyn CommandTarget,
    ) -> Option<Result<CommandOutcome, CommandError>> {
        let rest = input.trim().strip_prefix('/')?;
        let mut parts = rest.split_whitespace();
        let Some(name) = parts.next() else {
            return Some(Err(CommandError::Empty));
        };
        let args: Vec<&str> = parts.collect();

        let Some(command) = self.get(name) else {
            return Some(Err(CommandError::Unknown(format!("/{name}"))));
        };
        tracing::debug!("Running /{name} with {} args", args.len());

        let mut ctx = CommandContext {
            target,
            registry: self,
        };
        Some(command.execute(&args, &mut ctx))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FakeTarget;
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        let registry = CommandRegistry::with_defaults();
        let mut target = FakeTarget::new();
        assert_eq!(registry.execute("hello /clear", &mut target), None);
    }

    #[test]
    fn bare_slash_is_empty() {
        let registry = CommandRegistry::with_defaults();
        let mut target = FakeTarget::new();
        assert_eq!(
            registry.execute("/   ", &mut target),
            Some(Err(CommandError::Empty))
        );
    }

    #[test]
    fn unknown_command_names_itself() {
        let registry = CommandRegistry::with_defaults();
        let mut target = FakeTarget::new();
        let result = registry.execute("/frobnicate now", &mut target);
        assert_eq!(result, Some(Err(CommandError::Unknown("/frobnicate".into()))));
        assert_eq!(
            CommandError::Unknown("/frobnicate".into()).to_string(),
            "unknown command: /frobnicate"
        );
    }

    #[test]
    fn defaults_are_registered_and_sorted() {
        let registry = CommandRegistry::with_defaults();
        let names: Vec<&str> = registry.list().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            [
                "bookmark", "clear", "context", "exit", "focus", "help", "model", "stats",
                "task", "verbose", "workspace"
            ]
        );
        assert_eq!(registry.len(), 11);
    }

    #[test]
    fn register_replaces_same_name() {
        struct Custom;
        impl Command for Custom {
            fn name(&self) -> &'static str {
                "clear"
            }
            fn description(&self) -> &'static str {
                "custom"
            }
            fn usage(&self) -> &'static str {
                "/clear"
            }
            fn execute(
                &self,
                _args: &[&str],
                _ctx: &mut CommandContext<'_>,
            ) -> Result<CommandOutcome, CommandError> {
                Ok(CommandOutcome::reply("custom clear"))
            }
        }

        let registry = CommandRegistry::with_defaults();
        registry.register(Custom);
        let mut target = FakeTarget::new();
        assert_eq!(
            registry.execute("/clear", &mut target),
            Some(Ok(CommandOutcome::reply("custom clear")))
        );
        assert!(!target.cleared);
    }

    #[test]
    fn concurrent_registration_and_lookup() {
        struct Named(&'static str);
        impl Command for Named {
            fn name(&self) -> &'static str {
                self.0
            }
            fn description(&self) -> &'static str {
                ""
            }
            fn usage(&self) -> &'static str {
                ""
            }
            fn execute(
                &self,
                _args: &[&str],
                _ctx: &mut CommandContext<'_>,
            ) -> Result<CommandOutcome, CommandError> {
                Ok(CommandOutcome::Exit)
            }
        }

        const NAMES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let registry = CommandRegistry::new();
        std::thread::scope(|s| {
            for name in NAMES {
                let registry = &registry;
                s.spawn(move || registry.register(Named(name)));
                s.spawn(move || {
                    let _ = registry.get(name);
                    let _ = registry.list();
                });
            }
        });
        assert_eq!(registry.len(), NAMES.len());
    }
}
