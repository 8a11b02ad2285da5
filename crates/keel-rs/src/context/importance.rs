//! Keyword heuristic that pins messages against summarization.

use crate::MessageRole;

/// Lower-case substrings that mark a message as important.
pub const IMPORTANT_KEYWORDS: &[&str] = &[
    "error",
    "failed",
    "success",
    "completed",
    "implement",
    "create",
    "build",
    "deploy",
    "task:",
    "goal:",
    "objective:",
    "important:",
    "note:",
    "warning:",
];

/// Whether a message should survive trimming verbatim.
///
/// System messages always do. Anything else qualifies when its lower-cased
/// content contains one of [`IMPORTANT_KEYWORDS`].
pub fn is_important(role: MessageRole, content: &str) -> bool {
    if role == MessageRole::System {
        return true;
    }
    let lowered = content.to_lowercase();
    IMPORTANT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
