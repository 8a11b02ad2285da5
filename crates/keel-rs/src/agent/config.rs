//! Configuration for the [`Agent`](super::Agent).
//!
//! ```ignore
//! let config = AgentConfig::new("anthropic/claude-sonnet-4", "You are helpful.")
//!     .with_workdir("/path/to/project")
//!     .with_max_tokens(4000)
//!     .with_temperature(0.7)
//!     .with_max_tool_rounds(10);
//! ```

use std::path::PathBuf;

use crate::DEFAULT_MODEL;

/// Default completion length requested from the model.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default cap on follow-up rounds after tool calls in a single turn.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 10;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model identifier (e.g. `"anthropic/claude-sonnet-4"`). Also selects
    /// the context window size.
    pub model: String,
    /// Base system prompt. Session context and the tool list are appended
    /// every turn.
    pub system_prompt: String,
    /// Directory the session is rooted at and relative paths resolve against.
    pub workdir: PathBuf,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Follow-up model calls allowed after tool results in one turn.
    pub max_tool_rounds: u32,
    /// Include intermediate assistant text in the turn's reply.
    pub verbose: bool,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_prompt: system_prompt.into(),
            workdir: PathBuf::from("."),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            verbose: false,
        }
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, "")
    }
}
