//! The [`Agent`]: one user turn in, one reply out.
//!
//! A turn appends the user message to the context window, sends the
//! preamble plus the window to the model, and loops on tool calls until the
//! model answers in plain text or the round cap is reached. The session is
//! handed to the background writer after every successful turn. A failed
//! model call restores the window and session to where they were before the
//! turn started.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::capabilities::{
    BookmarkControl, ConversationControl, FocusControl, ModelControl, TaskControl,
    VerbosityControl,
};
use super::config::AgentConfig;
use super::prompt::build_preamble;
use crate::api::{ModelClient, model_context_limit};
use crate::context::{ContextStats, ContextWindow, is_important};
use crate::error::AgentError;
use crate::session::{SessionState, SessionStore, SessionWriter, absolutize, load_or_fresh};
use crate::tools::{ToolSet, names};
use crate::{ChatCompletion, ChatRequest, Message, MessageRole, ToolCall};

/// Appended to every tool-results message.
const CONTINUE_NUDGE: &str = "Continue task execution. Call the next required function \
                              immediately or provide task completion summary.";

pub struct Agent {
    client: Box<dyn ModelClient>,
    tools: ToolSet,
    config: AgentConfig,
    window: ContextWindow,
    session: SessionState,
    writer: SessionWriter,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.config.model)
            .field("tools", &self.tools)
            .field("messages", &self.window.messages().len())
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Build an agent. The context window is sized for `config.model`, and
    /// the saved session is loaded from `store` (or started fresh) and
    /// pointed at `config.workdir`.
    pub fn new(
        client: impl ModelClient + 'static,
        tools: ToolSet,
        store: impl SessionStore + 'static,
        config: AgentConfig,
    ) -> Self {
        let workdir =
            std::path::absolute(&config.workdir).unwrap_or_else(|_| config.workdir.clone());
        let store: Arc<dyn SessionStore> = Arc::new(store);
        let session = load_or_fresh(store.as_ref(), &workdir);
        let window = ContextWindow::new(model_context_limit(&config.model));
        info!(
            "Agent ready: model={}, context={} tokens, tools={}",
            config.model,
            window.max_tokens(),
            tools.len()
        );
        Self {
            client: Box::new(client),
            tools,
            config,
            window,
            session,
            writer: SessionWriter::new(store),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn window(&self) -> &ContextWindow {
        &self.window
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    // ── Turn ───────────────────────────────────────────────────────

    /// Run one user turn and return the assistant's reply.
    ///
    /// On error the context window and session are exactly as they were
    /// before the call.
    pub async fn process_message(&mut self, input: &str) -> Result<String, AgentError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::EmptyInput);
        }

        let window_before = self.window.clone();
        let session_before = self.session.clone();

        match self.run_turn(input).await {
            Ok(reply) => {
                self.persist_session();
                Ok(reply)
            }
            Err(e) => {
                warn!("Turn failed, restoring previous state: {e}");
                self.window = window_before;
                self.session = session_before;
                Err(e)
            }
        }
    }

    async fn run_turn(&mut self, input: &str) -> Result<String, AgentError> {
        self.add_message(MessageRole::User, input);
        let mut completion = self.request().await?;
        let mut replies: Vec<String> = Vec::new();
        let mut rounds = 0;

        loop {
            let text = completion.content.take().unwrap_or_default();
            if !text.trim().is_empty() {
                self.add_message(MessageRole::Assistant, &text);
            }

            if completion.tool_calls.is_empty() {
                replies.push(text);
                break;
            }
            if self.config.verbose && !text.trim().is_empty() {
                replies.push(text);
            }
            if rounds >= self.config.max_tool_rounds {
                warn!("Tool round limit ({rounds}) reached, ending turn");
                replies.push(format!("Stopped after {rounds} tool rounds."));
                break;
            }
            rounds += 1;

            let results = self.run_tool_calls(&completion.tool_calls).await;
            self.add_message(
                MessageRole::User,
                format!("Tool execution results:\n{results}\n\n{CONTINUE_NUDGE}"),
            );
            completion = self.request().await?;
        }

        let reply = replies
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");
        debug!("Turn finished after {rounds} tool rounds ({} bytes)", reply.len());
        Ok(reply)
    }

    fn add_message(&mut self, role: MessageRole, content: impl Into<String>) {
        let content = content.into();
        let important = is_important(role, &content);
        self.window.add_message(role, content, important);
    }

    async fn request(&self) -> Result<ChatCompletion, AgentError> {
        let defs = self.tools.list();
        let preamble = build_preamble(&self.config.system_prompt, &self.session, &defs);

        let mut messages = Vec::with_capacity(self.window.messages().len() + 2);
        messages.push(Message::system(preamble));
        messages.extend(self.window.request_messages());

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: (!defs.is_empty()).then_some(defs),
        };
        debug!(
            "Sending {} messages to {} (~{} context tokens)",
            request.messages.len(),
            request.model,
            self.window.current_tokens()
        );

        let completion = self
            .client
            .chat(&request)
            .await
            .map_err(AgentError::Model)?;
        if completion.is_empty() {
            return Err(AgentError::EmptyResponse);
        }
        Ok(completion)
    }

    /// Run tool calls one at a time and render their outcomes as one block.
    async fn run_tool_calls(&mut self, calls: &[ToolCall]) -> String {
        let mut rendered = Vec::with_capacity(calls.len());
        for call in calls {
            let name = call.function.name.as_str();
            let arguments = match call.function.arguments.trim() {
                "" => "{}",
                args => args,
            };
            let outcome = self.tools.execute(name, arguments).await;
            if outcome.success {
                self.track_file_operation(name, arguments);
            }
            rendered.push(outcome.render());
        }
        rendered.join("\n")
    }

    /// Record the path a successful file tool touched.
    fn track_file_operation(&mut self, tool: &str, arguments: &str) {
        let Ok(args) = serde_json::from_str::<serde_json::Value>(arguments) else {
            return;
        };
        let Some(path) = args
            .get("path")
            .and_then(serde_json::Value::as_str)
            .filter(|p| !p.is_empty())
        else {
            return;
        };
        let path = absolutize(self.session.working_dir(), path);

        match tool {
            names::READ_FILE | names::WRITE_FILE | names::EDIT_FILE => {
                self.session.add_focused_file(path.clone());
                self.session.add_recent_file(path);
            }
            names::LIST_DIRECTORY | names::FIND_FILES => {
                self.session.add_recent_file(path);
            }
            _ => {}
        }
    }

    // ── Persistence ────────────────────────────────────────────────

    /// Queue the current session for saving. Never blocks or fails.
    pub fn persist_session(&self) {
        self.writer.submit(self.session.clone());
    }

    /// Wait for queued session saves to finish.
    pub async fn shutdown(&self) {
        self.writer.flush().await;
    }
}

// ── Capabilities ───────────────────────────────────────────────────

impl ConversationControl for Agent {
    fn clear_conversation(&mut self) {
        self.window.clear_conversation();
    }

    fn context_stats(&self) -> ContextStats {
        self.window.stats()
    }

    fn context_usage_percentage(&self) -> f64 {
        self.window.usage_percentage()
    }
}

impl TaskControl for Agent {
    fn current_task(&self) -> &str {
        self.session.current_task()
    }

    fn set_current_task(&mut self, task: &str) {
        self.session.set_current_task(task);
    }

    fn complete_current_task(&mut self, files_changed: Vec<PathBuf>) -> Option<String> {
        self.session
            .complete_current_task(files_changed)
            .map(|t| t.description.clone())
    }

    fn session_summary(&self) -> String {
        self.session.context_summary()
    }
}

impl FocusControl for Agent {
    fn focused_files(&self) -> &[PathBuf] {
        self.session.focused_files()
    }

    fn add_focused_file(&mut self, path: PathBuf) {
        self.session.add_focused_file(path);
    }

    fn clear_focused_files(&mut self) {
        self.session.clear_focused_files();
    }

    fn working_dir(&self) -> &std::path::Path {
        self.session.working_dir()
    }

    fn workspace_info(&self) -> String {
        self.session.workspace_info()
    }
}

impl BookmarkControl for Agent {
    fn bookmark(&self, name: &str) -> Option<&std::path::Path> {
        self.session.bookmark(name)
    }

    fn set_bookmark(&mut self, name: &str, path: PathBuf) {
        self.session.set_bookmark(name, path);
    }

    fn bookmarks(&self) -> &std::collections::BTreeMap<String, PathBuf> {
        self.session.bookmarks()
    }
}

impl ModelControl for Agent {
    fn current_model(&self) -> &str {
        &self.config.model
    }

    /// Switch models and resize the context window to match.
    fn set_model(&mut self, model: &str) {
        self.config.model = model.to_string();
        self.window.set_max_tokens(model_context_limit(model));
        info!(
            "Switched model to {model} ({} token context)",
            self.window.max_tokens()
        );
    }
}

impl VerbosityControl for Agent {
    fn is_verbose(&self) -> bool {
        self.config.verbose
    }

    fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }
}
