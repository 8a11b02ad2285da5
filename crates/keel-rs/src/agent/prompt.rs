//! System preamble assembly.
//!
//! [`SystemPromptBuilder`] joins a base prompt and `## Heading` sections into
//! one string. [`session_context_block`] and [`tool_listing`] render the two
//! dynamic sections the agent adds every turn.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::ToolDef;
use crate::session::{ProjectType, SessionState};

/// Heading of the session section in the preamble.
pub const SESSION_CONTEXT_HEADING: &str = "Session Context";

/// Heading of the tool list in the preamble.
pub const AVAILABLE_TOOLS_HEADING: &str = "Available Tools";

/// Focused and recent files listed in the session section.
const FILES_SHOWN: usize = 3;

/// Builder for multi-section system prompts.
///
/// Sections are joined with double newlines. Empty sections are skipped.
///
/// # Example
///
/// ```
/// use keel_rs::agent::prompt::SystemPromptBuilder;
///
/// let prompt = SystemPromptBuilder::new("You are a coding assistant.")
///     .section("Session Context", "Current Task: fix the parser")
///     .section_opt("Missing", None::<String>)
///     .build();
///
/// assert!(prompt.contains("## Session Context"));
/// assert!(!prompt.contains("## Missing"));
/// ```
#[derive(Debug, Clone)]
pub struct SystemPromptBuilder {
    sections: Vec<String>,
}

impl SystemPromptBuilder {
    /// Start with a base prompt, included as-is without a heading.
    pub fn new(preamble: impl Into<String>) -> Self {
        let preamble = preamble.into();
        Self {
            sections: if preamble.is_empty() {
                Vec::new()
            } else {
                vec![preamble]
            },
        }
    }

    /// Append a `## heading` section. Skipped if `content` is empty.
    pub fn section(mut self, heading: &str, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(format!("## {heading}\n\n{content}"));
        }
        self
    }

    /// Append a section only when `condition` holds. `content_fn` is not
    /// called otherwise.
    pub fn section_if(
        self,
        condition: bool,
        heading: &str,
        content_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.section(heading, content_fn())
        } else {
            self
        }
    }

    /// Append a section only if the content is `Some`.
    pub fn section_opt(self, heading: &str, content: Option<impl Into<String>>) -> Self {
        match content {
            Some(c) => self.section(heading, c),
            None => self,
        }
    }

    /// Append raw text without a heading. Skipped if empty.
    pub fn raw(mut self, content: impl Into<String>) -> Self {
        let content = content.into();
        if !content.is_empty() {
            self.sections.push(content);
        }
        self
    }

    pub fn build(self) -> String {
        self.sections.join("\n\n")
    }
}

/// Session facts for the preamble.
///
/// Returns `None` unless there is something worth telling the model: a
/// project root, a current task, or focused files.
pub fn session_context_block(state: &SessionState) -> Option<String> {
    let focused = state.focused_files();
    if state.project_root().is_none() && !state.has_current_task() && focused.is_empty() {
        return None;
    }

    let mut out = String::new();
    if let Some(root) = state.project_root() {
        let name = root
            .file_name()
            .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
        let _ = write!(out, "Project: {name}");
        if let Some(kind) = state.project_type()
            && kind != ProjectType::Unknown
        {
            let _ = write!(out, " ({kind})");
        }
        out.push('\n');
    }
    let _ = writeln!(out, "Working Directory: {}", state.working_dir().display());
    if state.has_current_task() {
        let _ = writeln!(out, "Current Task: {}", state.current_task());
    }

    if !focused.is_empty() {
        out.push_str("Recently Active Files:\n");
        for (i, file) in focused.iter().take(FILES_SHOWN).enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, file.display());
        }
        if focused.len() > FILES_SHOWN {
            let _ = writeln!(out, "  ... and {} more files", focused.len() - FILES_SHOWN);
        }
    }

    let focused_set: HashSet<&PathBuf> = focused.iter().collect();
    let others: Vec<&PathBuf> = state
        .recent_files()
        .iter()
        .filter(|f| !focused_set.contains(f))
        .take(FILES_SHOWN)
        .collect();
    if !others.is_empty() {
        out.push_str("Other Recent Files:\n");
        for (i, file) in others.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, file.display());
        }
    }

    if !state.bookmarks().is_empty() {
        let _ = writeln!(out, "Available Bookmarks: {}", state.bookmarks().len());
    }
    if let Some(last) = state.task_history().last() {
        let _ = writeln!(out, "Completed Tasks: {}", state.task_history().len());
        let _ = writeln!(out, "Last Completed: {}", last.description);
    }

    Some(out.trim_end().to_string())
}

/// One `- name: description` line per tool.
pub fn tool_listing(defs: &[ToolDef]) -> String {
    defs.iter()
        .map(|d| format!("- {}: {}", d.name(), d.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The full preamble for one turn.
pub fn build_preamble(base: &str, state: &SessionState, tools: &[ToolDef]) -> String {
    SystemPromptBuilder::new(base)
        .section_opt(SESSION_CONTEXT_HEADING, session_context_block(state))
        .section_if(!tools.is_empty(), AVAILABLE_TOOLS_HEADING, || tool_listing(tools))
        .build()
}
