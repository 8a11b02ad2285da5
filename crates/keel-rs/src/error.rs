//! Error types surfaced by the agent.
//!
//! Collaborator internals (HTTP client, tools) report failures as strings;
//! this enum classifies them at the agent boundary.

/// Failure of a single agent turn. The conversation and session state are
/// left as they were before the turn started.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("failed to get model response: {0}")]
    Model(String),

    #[error("model returned no response")]
    EmptyResponse,

    #[error("message is empty")]
    EmptyInput,
}
