//! Token-bounded conversation log.
//!
//! [`ContextWindow`] holds every message of the live conversation plus a
//! running text summary of messages that no longer fit. After each append it
//! checks the budget; when usage exceeds
//! `max_tokens - reserved_tokens - summary_budget_tokens`, every message that
//! is neither important nor among the [`RECENCY_FLOOR`] most recent is folded
//! into the summary and dropped.
//!
//! The window performs no I/O and needs no locking: the agent owns it and
//! mutates it only from its turn.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::estimator::{CharRatioEstimator, TokenEstimator};
use super::summarizer;
use crate::{Message, MessageRole};

/// Number of most recent messages that trimming never touches.
pub const RECENCY_FLOOR: usize = 10;

/// Default budget held back for the system preamble and tool schemas.
pub const DEFAULT_RESERVED_TOKENS: usize = 2000;

/// Default slack left for summary growth when deciding to trim.
pub const DEFAULT_SUMMARY_BUDGET_TOKENS: usize = 500;

/// Id carried by the synthetic summary message.
pub const SUMMARY_MESSAGE_ID: &str = "summary";

/// Generate a process-unique message id.
pub fn generate_message_id() -> String {
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("msg-{ts:x}-{count:04x}")
}

// ── ContextMessage ─────────────────────────────────────────────────

/// A message in the window. Only the importance flag can change after
/// construction, and only through [`ContextWindow::mark_important`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    id: String,
    role: MessageRole,
    content: String,
    token_estimate: usize,
    created_at: DateTime<Utc>,
    important: bool,
}

impl ContextMessage {
    pub fn new(
        role: MessageRole,
        content: impl Into<String>,
        token_estimate: usize,
        important: bool,
    ) -> Self {
        Self::with_id(generate_message_id(), role, content, token_estimate, important)
    }

    fn with_id(
        id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
        token_estimate: usize,
        important: bool,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            token_estimate,
            created_at: Utc::now(),
            important,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn token_estimate(&self) -> usize {
        self.token_estimate
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_important(&self) -> bool {
        self.important
    }

    /// Convert to the wire message sent to the model.
    pub fn to_message(&self) -> Message {
        Message::new(self.role, self.content.clone())
    }
}

// ── ContextStats ───────────────────────────────────────────────────

/// Point-in-time snapshot of window usage.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextStats {
    pub current_tokens: usize,
    /// `max_tokens - reserved_tokens`.
    pub available_tokens: usize,
    pub max_tokens: usize,
    pub reserved_tokens: usize,
    pub message_count: usize,
    pub important_count: usize,
    pub has_summary: bool,
    pub usage_pct: f64,
}

impl fmt::Display for ContextStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Context Window Stats:")?;
        writeln!(f, "- Current tokens: {}", self.current_tokens)?;
        writeln!(f, "- Available tokens: {}", self.available_tokens)?;
        writeln!(f, "- Max tokens: {}", self.max_tokens)?;
        writeln!(f, "- Reserved tokens: {}", self.reserved_tokens)?;
        writeln!(f, "- Messages: {}", self.message_count)?;
        writeln!(f, "- Important messages: {}", self.important_count)?;
        writeln!(f, "- Has summary: {}", self.has_summary)?;
        write!(f, "- Usage: {:.1}%", self.usage_pct)
    }
}

// ── ContextWindow ──────────────────────────────────────────────────

/// Bounded conversation log with importance pinning and summary folding.
///
/// # Example
///
/// ```
/// use keel_rs::MessageRole;
/// use keel_rs::context::ContextWindow;
///
/// let mut window = ContextWindow::new(8_000)
///     .with_reserved_tokens(1_000)
///     .with_summary_budget(200);
/// window.add_message(MessageRole::System, "You are a coding assistant.", true);
/// window.add_message(MessageRole::User, "hello", false);
///
/// assert_eq!(window.messages().len(), 2);
/// assert!(window.summary().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ContextWindow {
    max_tokens: usize,
    reserved_tokens: usize,
    summary_budget_tokens: usize,
    messages: Vec<ContextMessage>,
    important_messages: Vec<ContextMessage>,
    summary: String,
    estimator: Arc<dyn TokenEstimator>,
}

impl ContextWindow {
    /// Create a window for a model with `max_tokens` of context, using the
    /// default reserves and a 4 chars-per-token estimator.
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens,
            reserved_tokens: DEFAULT_RESERVED_TOKENS,
            summary_budget_tokens: DEFAULT_SUMMARY_BUDGET_TOKENS,
            messages: Vec::new(),
            important_messages: Vec::new(),
            summary: String::new(),
            estimator: Arc::new(CharRatioEstimator::default()),
        }
    }

    /// Tokens held back for the system preamble and tool schemas.
    pub fn with_reserved_tokens(mut self, tokens: usize) -> Self {
        self.reserved_tokens = tokens;
        self
    }

    /// Slack left for summary growth when deciding whether to trim.
    pub fn with_summary_budget(mut self, tokens: usize) -> Self {
        self.summary_budget_tokens = tokens;
        self
    }

    /// Replace the token estimation policy.
    pub fn with_estimator(mut self, estimator: impl TokenEstimator + 'static) -> Self {
        self.estimator = Arc::new(estimator);
        self
    }

    // ── Mutation ───────────────────────────────────────────────────

    /// Append a message and trim if the budget is exceeded. Returns the new
    /// message's id.
    pub fn add_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        important: bool,
    ) -> String {
        let content = content.into();
        let tokens = self.estimator.estimate(&content);
        let message = ContextMessage::new(role, content, tokens, important);
        let id = message.id.clone();

        if important {
            self.important_messages.push(message.clone());
        }
        self.messages.push(message);
        self.trim_if_needed();
        id
    }

    /// Fold old, unpinned messages into the summary when over budget.
    ///
    /// Keeps every important message and the [`RECENCY_FLOOR`] most recent
    /// messages, in their original order. Running it again without an
    /// intervening append changes nothing.
    ///
    /// The summary is never shortened. Once it alone leaves no room for the
    /// recency floor, usage stays above the threshold and each append folds
    /// one more message into it.
    pub fn trim_if_needed(&mut self) {
        let threshold = self.trim_threshold();
        let current = self.current_tokens();
        if current <= threshold {
            return;
        }

        let total = self.messages.len();
        let recent_start = total.saturating_sub(RECENCY_FLOOR);
        let (keep, fold): (Vec<_>, Vec<_>) = std::mem::take(&mut self.messages)
            .into_iter()
            .enumerate()
            .partition(|(i, m)| *i >= recent_start || m.important);

        self.messages = keep.into_iter().map(|(_, m)| m).collect();
        if fold.is_empty() {
            debug!(
                "Context over budget ({current} > {threshold} tokens) but nothing is foldable"
            );
            return;
        }

        let folded: Vec<ContextMessage> = fold.into_iter().map(|(_, m)| m).collect();
        let section = summarizer::summarize_span(&folded);
        self.summary = summarizer::fold_into(&self.summary, &section);
        debug!(
            "Folded {} message(s) into summary; {} kept, now {} tokens (threshold {threshold})",
            folded.len(),
            self.messages.len(),
            self.current_tokens(),
        );
    }

    /// Drop the live conversation, keeping only pinned messages. The
    /// summary is discarded; the pinned list itself is untouched.
    pub fn clear_conversation(&mut self) {
        self.messages = self.important_messages.clone();
        self.summary.clear();
    }

    /// Pin a live message by id. Returns `false` when the id is unknown or
    /// the message is already important.
    pub fn mark_important(&mut self, id: &str) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id == id) else {
            return false;
        };
        if message.important {
            return false;
        }
        message.important = true;
        self.important_messages.push(message.clone());
        true
    }

    /// Re-budget the window, for example after a model switch.
    pub fn set_max_tokens(&mut self, max_tokens: usize) {
        self.max_tokens = max_tokens;
        self.trim_if_needed();
    }

    // ── Queries ────────────────────────────────────────────────────

    /// The sequence handed to the model: a synthetic system message carrying
    /// the summary (when there is one), then every live message in order.
    pub fn contextual_messages(&self) -> Vec<ContextMessage> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);
        if !self.summary.is_empty() {
            out.push(ContextMessage::with_id(
                SUMMARY_MESSAGE_ID,
                MessageRole::System,
                self.summary.clone(),
                self.estimator.estimate(&self.summary),
                false,
            ));
        }
        out.extend(self.messages.iter().cloned());
        out
    }

    /// [`contextual_messages`](Self::contextual_messages) as wire messages.
    pub fn request_messages(&self) -> Vec<Message> {
        self.contextual_messages()
            .iter()
            .map(ContextMessage::to_message)
            .collect()
    }

    /// Estimated tokens of live messages plus the summary.
    pub fn current_tokens(&self) -> usize {
        let messages: usize = self.messages.iter().map(|m| m.token_estimate).sum();
        messages + self.summary_tokens()
    }

    fn summary_tokens(&self) -> usize {
        if self.summary.is_empty() {
            0
        } else {
            self.estimator.estimate(&self.summary)
        }
    }

    /// `max_tokens - reserved_tokens`, floored at zero.
    pub fn available_tokens(&self) -> usize {
        self.max_tokens.saturating_sub(self.reserved_tokens)
    }

    /// Usage above which trimming kicks in.
    pub fn trim_threshold(&self) -> usize {
        self.available_tokens()
            .saturating_sub(self.summary_budget_tokens)
    }

    /// Current usage as a percentage of available tokens. A window with no
    /// available tokens reports 100.0.
    pub fn usage_percentage(&self) -> f64 {
        let available = self.available_tokens();
        if available == 0 {
            return 100.0;
        }
        self.current_tokens() as f64 / available as f64 * 100.0
    }

    pub fn stats(&self) -> ContextStats {
        ContextStats {
            current_tokens: self.current_tokens(),
            available_tokens: self.available_tokens(),
            max_tokens: self.max_tokens,
            reserved_tokens: self.reserved_tokens,
            message_count: self.messages.len(),
            important_count: self.important_messages.len(),
            has_summary: !self.summary.is_empty(),
            usage_pct: self.usage_percentage(),
        }
    }

    pub fn messages(&self) -> &[ContextMessage] {
        &self.messages
    }

    pub fn important_messages(&self) -> &[ContextMessage] {
        &self.important_messages
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn reserved_tokens(&self) -> usize {
        self.reserved_tokens
    }

    pub fn summary_budget_tokens(&self) -> usize {
        self.summary_budget_tokens
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.summary.is_empty()
    }
}
