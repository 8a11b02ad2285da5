//! Agent runtime: the [`Agent`] turn loop and its supporting pieces.
//!
//! - [`turn::Agent`]: runs one user turn against the model, executes tool
//!   calls, tracks touched files and persists the session. Start here.
//! - [`config::AgentConfig`]: model, base prompt, limits.
//! - [`capabilities`]: the narrow traits slash commands act through.
//! - [`prompt`]: [`SystemPromptBuilder`] and the per-turn preamble.

pub mod capabilities;
pub mod config;
pub mod prompt;
pub mod turn;

pub use capabilities::{
    BookmarkControl, CommandTarget, ConversationControl, FocusControl, ModelControl, TaskControl,
    VerbosityControl,
};
pub use config::AgentConfig;
pub use prompt::SystemPromptBuilder;
pub use turn::Agent;
