//! Session, focus and bookmark commands.

use std::fmt::Write as _;

use super::{Command, CommandCategory, CommandContext, CommandError, CommandOutcome, no_arguments};
use crate::agent::{FocusControl, TaskControl};
use crate::session::absolutize;

/// Shared by `/task` and `/context task`.
fn task_action(args: &[&str], tasks: &mut dyn TaskControl) -> String {
    match args {
        [] => {
            let current = tasks.current_task();
            if current.is_empty() {
                "No current task set".to_string()
            } else {
                format!("Current task: {current}")
            }
        }
        ["clear"] => {
            tasks.set_current_task("");
            "Cleared current task".to_string()
        }
        ["complete"] => match tasks.complete_current_task(Vec::new()) {
            Some(done) => format!("Completed task: {done}"),
            None => "No current task to complete".to_string(),
        },
        words => {
            let description = words.join(" ");
            tasks.set_current_task(&description);
            format!("Set current task: {description}")
        }
    }
}

// ── /context ───────────────────────────────────────────────────────

pub struct ContextCommand;

impl Command for ContextCommand {
    fn name(&self) -> &'static str {
        "context"
    }

    fn description(&self) -> &'static str {
        "Manage session context, tasks, and view stats"
    }

    fn usage(&self) -> &'static str {
        "/context [stats|task <description>|task clear|task complete]"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Context
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let reply = match args.split_first() {
            None => ctx.target.session_summary(),
            Some((&"stats", [])) => ctx.target.context_stats().to_string(),
            Some((&"task", rest)) => task_action(rest, &mut *ctx.target),
            Some((other, _)) => {
                return Err(CommandError::InvalidArgument(format!(
                    "unknown subcommand: {other}. Use '/context', '/context stats', or '/context task'"
                )));
            }
        };
        Ok(CommandOutcome::Reply(reply))
    }
}

// ── /task ──────────────────────────────────────────────────────────

pub struct TaskCommand;

impl Command for TaskCommand {
    fn name(&self) -> &'static str {
        "task"
    }

    fn description(&self) -> &'static str {
        "Set or show current task"
    }

    fn usage(&self) -> &'static str {
        "/task [description] or /task clear or /task complete"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Context
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        Ok(CommandOutcome::Reply(task_action(args, &mut *ctx.target)))
    }
}

// ── /focus ─────────────────────────────────────────────────────────

pub struct FocusCommand;

impl FocusCommand {
    fn list(focus: &dyn FocusControl) -> String {
        let focused = focus.focused_files();
        if focused.is_empty() {
            return "No files currently focused".to_string();
        }
        let mut out = format!("Focused files ({}):", focused.len());
        for (i, file) in focused.iter().enumerate() {
            let _ = write!(out, "\n{}. {}", i + 1, file.display());
        }
        out
    }
}

impl Command for FocusCommand {
    fn name(&self) -> &'static str {
        "focus"
    }

    fn description(&self) -> &'static str {
        "Set focus to specific files"
    }

    fn usage(&self) -> &'static str {
        "/focus <file1> [file2] ... or /focus clear"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Context
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let focus: &mut dyn FocusControl = &mut *ctx.target;
        let reply = match args {
            [] => Self::list(focus),
            ["clear"] => {
                focus.clear_focused_files();
                "Cleared all focused files".to_string()
            }
            files => {
                let mut added = Vec::with_capacity(files.len());
                for file in files {
                    let path = absolutize(focus.working_dir(), file);
                    added.push(path.display().to_string());
                    focus.add_focused_file(path);
                }
                format!("Added {} files to focus:\n{}", added.len(), added.join("\n"))
            }
        };
        Ok(CommandOutcome::Reply(reply))
    }
}

// ── /bookmark ──────────────────────────────────────────────────────

pub struct BookmarkCommand;

impl Command for BookmarkCommand {
    fn name(&self) -> &'static str {
        "bookmark"
    }

    fn description(&self) -> &'static str {
        "List, show or set named path bookmarks"
    }

    fn usage(&self) -> &'static str {
        "/bookmark [name [path]]"
    }

    fn category(&self) -> CommandCategory {
        CommandCategory::Context
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        let reply = match args {
            [] => {
                let marks = ctx.target.bookmarks();
                if marks.is_empty() {
                    "No bookmarks set".to_string()
                } else {
                    let mut out = format!("Bookmarks ({}):", marks.len());
                    for (name, path) in marks {
                        let _ = write!(out, "\n  {name} -> {}", path.display());
                    }
                    out
                }
            }
            [name] => match ctx.target.bookmark(name) {
                Some(path) => format!("{name} -> {}", path.display()),
                None => {
                    return Err(CommandError::InvalidArgument(format!(
                        "no bookmark named '{name}'"
                    )));
                }
            },
            [name, path] => {
                let path = absolutize(ctx.target.working_dir(), path);
                let reply = format!("Bookmarked {name} -> {}", path.display());
                ctx.target.set_bookmark(name, path);
                reply
            }
            _ => {
                return Err(CommandError::InvalidArgument(format!(
                    "usage: {}",
                    self.usage()
                )));
            }
        };
        Ok(CommandOutcome::Reply(reply))
    }
}

// ── /workspace ─────────────────────────────────────────────────────

pub struct WorkspaceCommand;

impl Command for WorkspaceCommand {
    fn name(&self) -> &'static str {
        "workspace"
    }

    fn description(&self) -> &'static str {
        "Show working directory and detected project"
    }

    fn usage(&self) -> &'static str {
        "/workspace"
    }

    fn execute(
        &self,
        args: &[&str],
        ctx: &mut CommandContext<'_>,
    ) -> Result<CommandOutcome, CommandError> {
        no_arguments(self, args)?;
        Ok(CommandOutcome::Reply(ctx.target.workspace_info()))
    }
}
