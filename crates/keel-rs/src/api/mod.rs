//! Model-client seam and per-model limits.
//!
//! The agent talks to the LLM only through [`ModelClient`], so tests can
//! substitute a scripted client and hosting programs can wrap the HTTP client
//! with their own retry or routing policy. The core never retries.

use std::future::Future;
use std::pin::Pin;

use crate::{ChatCompletion, ChatRequest, OpenRouterClient};

/// Boxed future returned by [`ModelClient::chat`].
pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatCompletion, String>> + Send + 'a>>;

/// An opaque chat-completion call.
///
/// Errors are transport or provider failures rendered as strings. Uses a boxed
/// future so the trait stays dyn-compatible.
pub trait ModelClient: Send + Sync {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a>;
}

impl ModelClient for OpenRouterClient {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        Box::pin(OpenRouterClient::chat(self, request))
    }
}

impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        (**self).chat(request)
    }
}

impl<T: ModelClient + ?Sized> ModelClient for std::sync::Arc<T> {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        (**self).chat(request)
    }
}

// ── Context limits ─────────────────────────────────────────────────

/// Fallback context size for models we don't recognise.
pub const DEFAULT_CONTEXT_LIMIT: usize = 32_000;

/// Approximate context window size, in tokens, for a model id.
///
/// Matches on the segment after the last `/` so an org prefix like
/// `"my-org/claude-finetune"` is judged by its model name.
pub fn model_context_limit(model: &str) -> usize {
    let name = model.rsplit('/').next().unwrap_or(model).to_lowercase();

    if name.contains("claude") {
        200_000
    } else if name.contains("gpt-4o") || name.contains("gpt-4-turbo") {
        128_000
    } else if name.contains("gemini") {
        1_000_000
    } else if name.contains("llama") {
        32_000
    } else {
        DEFAULT_CONTEXT_LIMIT
    }
}
