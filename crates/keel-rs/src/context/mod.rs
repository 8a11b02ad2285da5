//! Context window management: budgets, importance, and summarization.
//!
//! The context window is the scarcest resource in a long coding session.
//! This module keeps it bounded with three cooperating pieces:
//!
//! 1. **[`estimator`]** ([`TokenEstimator`]): converts text into an
//!    approximate token cost. The default is 4 characters per token.
//!
//! 2. **[`importance`]** ([`is_important`]): a keyword heuristic that pins
//!    messages so trimming never folds them away.
//!
//! 3. **[`window`]** ([`ContextWindow`]): the message log itself. After every
//!    append it trims when over budget, keeping pinned messages and the last
//!    ten, and hands the rest to the **[`summarizer`]**, which files them into
//!    topic buckets of one-line entries appended to a running summary.

pub mod estimator;
pub mod importance;
pub mod summarizer;
pub mod window;

pub use estimator::{CharRatioEstimator, DEFAULT_CHARS_PER_TOKEN, TokenEstimator};
pub use importance::{IMPORTANT_KEYWORDS, is_important};
pub use window::{ContextMessage, ContextStats, ContextWindow, RECENCY_FLOOR};
