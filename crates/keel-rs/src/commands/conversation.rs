//! Conversation, model and system commands.

use std::fmt::Write as _;

use super::{
    Command, CommandCategory, CommandContext, CommandError, CommandOutcome, CommandRegistry,
    no_arguments,
};

/// Models `/model` accepts.
pub const KNOWN_MODELS: &[&str] = &[
    "anthropic/claude-sonnet-4",
    "anthropic/claude-3-5-sonnet-20241022",
    "anthropic/claude-3-5-haiku-20241022",
    "anthropic/claude-4-opus-20240229",
    "openai/gpt-4o",
    "openai/gpt-4o-mini",
    "openai/gpt-4-turbo",
    "google/gemini-pro-1.5",
    "meta-llama/llama-3.1-405b-instruct",
    "meta-llama/llama-3.1-70b-instruct",
    "meta-llama/llama-3.1-8b-instruct",
];

const VERBOSE_ON: &str = "Verbose mode enabled. AI will provide detailed responses.";
const VERBOSE_OFF: &str = "Quiet mode enabled. AI responses will be more concise.";

// ── /clear ─────────────────────────────────────────────────────────

pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn description(&self) -> &'static str {
        "Clear the chat history and start fresh"
    }

    fn usage(&self) -> &'static str {
        "/clear"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Session
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        no_arguments(self, args)?;
        ctx.target.clear_conversation();
        Ok(CommandOutcome::reply("Chat history cleared successfully"))
    }
}

// ── /stats ─────────────────────────────────────────────────────────

pub struct StatsCommand;

impl Command for StatsCommand {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn description(&self) -> &'static str {
        "Show context window statistics"
    }

    fn usage(&self) -> &'static str {
        "/stats"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Context
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        no_arguments(self, args)?;
        Ok(CommandOutcome::Reply(ctx.target.context_stats().to_string()))
    }
}

// ── /verbose ───────────────────────────────────────────────────────

pub struct VerboseCommand;

fn parse_switch(arg: &str) -> Option<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl Command for VerboseCommand {
    fn name(&self) -> &'static str {
        "verbose"
    }

    fn description(&self) -> &'static str {
        "Control verbosity of AI responses (on/off)"
    }

    fn usage(&self) -> &'static str {
        "/verbose [on|off]"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Model
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let verbose = match args.first() {
            None => !ctx.target.is_verbose(),
            Some(arg) => parse_switch(arg).ok_or_else(|| {
                CommandError::InvalidArgument(format!(
                    "invalid argument: {arg}. Use 'on' or 'off'"
                ))
            })?,
        };
        ctx.target.set_verbose(verbose);
        Ok(CommandOutcome::reply(if verbose { VERBOSE_ON } else { VERBOSE_OFF }))
    }
}

// ── /model ─────────────────────────────────────────────────────────

pub struct ModelCommand;

impl Command for ModelCommand {
    fn name(&self) -> &'static str {
        "model"
    }

    fn description(&self) -> &'static str {
        "Switch the AI model"
    }

    fn usage(&self) -> &'static str {
        "/model <model-name> or /model to see current model"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Model
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let Some(&model) = args.first() else {
            return Ok(CommandOutcome::Reply(format!(
                "Current model: {}",
                ctx.target.current_model()
            )));
        };
        if !KNOWN_MODELS.iter().any(|known| *known == model) {
            return Err(CommandError::InvalidArgument(format!(
                "invalid model: {model}\nValid models: {}",
                KNOWN_MODELS.join(", ")
            )));
        }

        let previous = ctx.target.current_model().to_string();
        ctx.target.set_model(model);
        Ok(CommandOutcome::Reply(format!(
            "Model changed from {previous} to {model}"
        )))
    }
}

// ── /help ──────────────────────────────────────────────────────────

pub struct HelpCommand;

impl HelpCommand {
    fn command_help(command: &dyn Command) -> String {
        format!(
            "Command: /{}\nDescription: {}\nUsage: {}",
            command.name(),
            command.description(),
            command.usage()
        )
    }

    fn overview(registry: &CommandRegistry) -> String {
        let commands = registry.list();
        let mut out = String::from("Available Commands\n");
        out.push_str(&"─".repeat(50));
        out.push_str("\n\n");

        for category in CommandCategory::ALL {
            let in_category: Vec<_> = commands
                .iter()
                .filter(|c| c.category() == category)
                .collect();
            if in_category.is_empty() {
                continue;
            }
            let _ = writeln!(out, "{}:", category.heading());
            for command in in_category {
                let _ = writeln!(out, "  /{} - {}", command.name(), command.description());
            }
            out.push('\n');
        }

        out.push_str("Usage Tips:\n");
        out.push_str("• Use /help <command> for detailed help on a specific command\n");
        out.push_str("• Use /stats to see how much of the context window is in use\n");
        out.push_str("• Use /focus to set files for the AI to pay attention to");
        out
    }
}

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }

    fn description(&self) -> &'static str {
        "Show available commands and usage information"
    }

    fn usage(&self) -> &'static str {
        "/help [command]"
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let Some(name) = args.first() else {
            return Ok(CommandOutcome::Reply(Self::overview(ctx.registry)));
        };
        let name = name.trim_start_matches('/');
        Ok(CommandOutcome::Reply(match ctx.registry.get(name) {
            Some(command) => Self::command_help(command.as_ref()),
            None => format!(
                "Command '{name}' not found. Use /help to see all available commands."
            ),
        }))
    }
}

// ── /exit ──────────────────────────────────────────────────────────

pub struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn description(&self) -> &'static str {
        "Exit the application"
    }

    fn usage(&self) -> &'static str {
        "/exit"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Session
    }

    fn execute(
        &self,
        _args: &[&str],
        _ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::Exit)
    }
}
