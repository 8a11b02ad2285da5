//! Convenience re-exports for common `keel-rs` types.
//!
//! Meant to be glob-imported by front ends:
//!
//! ```ignore
//! use keel_rs::prelude::*;
//! ```
//!
//! This pulls in what a REPL or one-shot CLI needs: the [`Agent`] and its
//! config, the model client, the tool set, session storage and the command
//! registry. Summarizer internals and the background writer are left out;
//! import those from their modules directly when needed.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{
    ChatCompletion, ChatRequest, DEFAULT_MODEL, Message, MessageRole, OpenRouterClient, ToolCall,
    ToolDef, json_schema_for,
};

// ── Agent runtime ───────────────────────────────────────────────────
pub use crate::agent::{
    Agent, AgentConfig, BookmarkControl, CommandTarget, ConversationControl, FocusControl,
    ModelControl, SystemPromptBuilder, TaskControl, VerbosityControl,
};
pub use crate::api::{ModelClient, model_context_limit};
pub use crate::error::AgentError;

// ── Commands ────────────────────────────────────────────────────────
pub use crate::commands::{Command, CommandError, CommandOutcome, CommandRegistry};

// ── Context and session ─────────────────────────────────────────────
pub use crate::context::{ContextStats, ContextWindow};
pub use crate::session::{JsonFileStore, ProjectType, SessionState, SessionStore};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::{Tool, ToolFuture, ToolOutcome, ToolSet, parse_tool_args};
