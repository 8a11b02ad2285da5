//! Keyword-bucket summarization of trimmed messages.
//!
//! Trimmed messages are folded into a running text summary. Each message
//! lands in one topic bucket and is kept as a single truncated line. The
//! result is lossy: summarized messages cannot be recovered. Every function
//! here is pure so trimming can be tested without a model.

use super::window::ContextMessage;

/// Maximum characters of content kept per summary line.
pub const SUMMARY_LINE_CHARS: usize = 100;

/// Topic bucket a summarized message is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryBucket {
    Tasks,
    Code,
    Other,
}

impl SummaryBucket {
    /// Section heading, without the trailing colon.
    pub fn heading(self) -> &'static str {
        match self {
            SummaryBucket::Tasks => "Tasks/Implementation",
            SummaryBucket::Code => "Code/File Operations",
            SummaryBucket::Other => "Other Discussion",
        }
    }
}

const TASK_KEYWORDS: &[&str] = &["task", "implement", "create"];
const CODE_KEYWORDS: &[&str] = &["file", "code", "function"];

/// File a message under a bucket by lower-cased keyword match. Task keywords
/// are checked before code keywords.
pub fn classify(content: &str) -> SummaryBucket {
    let lowered = content.to_lowercase();
    if TASK_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        SummaryBucket::Tasks
    } else if CODE_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        SummaryBucket::Code
    } else {
        SummaryBucket::Other
    }
}

/// Cut `content` to `max` characters, appending `...` when anything was cut.
pub fn truncate_content(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((byte_idx, _)) => {
            let mut cut = content.get(..byte_idx).unwrap_or(content).to_string();
            cut.push_str("...");
            cut
        }
        None => content.to_string(),
    }
}

/// Render one summary section for a span of trimmed messages.
///
/// Returns an empty string for an empty span.
pub fn summarize_span(messages: &[ContextMessage]) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let mut tasks = Vec::new();
    let mut code = Vec::new();
    let mut other = Vec::new();

    for msg in messages {
        let line = format!(
            "- {}: {}",
            msg.role(),
            truncate_content(msg.content(), SUMMARY_LINE_CHARS)
        );
        match classify(msg.content()) {
            SummaryBucket::Tasks => tasks.push(line),
            SummaryBucket::Code => code.push(line),
            SummaryBucket::Other => other.push(line),
        }
    }

    let mut section = format!(
        "=== Conversation Summary ({} messages) ===\n",
        messages.len()
    );
    for (bucket, lines) in [
        (SummaryBucket::Tasks, &tasks),
        (SummaryBucket::Code, &code),
        (SummaryBucket::Other, &other),
    ] {
        if lines.is_empty() {
            continue;
        }
        section.push_str(bucket.heading());
        section.push_str(":\n");
        for line in lines {
            section.push_str(line);
            section.push('\n');
        }
        if bucket != SummaryBucket::Other {
            section.push('\n');
        }
    }
    section
}

/// Append a new section to an existing summary. Prior text is never dropped.
pub fn fold_into(existing: &str, section: &str) -> String {
    match (existing.is_empty(), section.is_empty()) {
        (_, true) => existing.to_string(),
        (true, false) => section.to_string(),
        (false, false) => format!("{existing}\n\n{section}"),
    }
}
