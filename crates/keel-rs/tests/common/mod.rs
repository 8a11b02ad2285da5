//! Shared helpers for the agent integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use keel_rs::api::ChatFuture;
use keel_rs::prelude::*;

/// Model client that replays a fixed script and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<ChatCompletion, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(script: impl IntoIterator<Item = Result<ChatCompletion, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn push(&self, reply: Result<ChatCompletion, String>) {
        self.script.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl ModelClient for ScriptedClient {
    fn chat<'a>(&'a self, request: &'a ChatRequest) -> ChatFuture<'a> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));
        Box::pin(async move { reply })
    }
}

pub fn text(content: &str) -> Result<ChatCompletion, String> {
    Ok(ChatCompletion::text(content))
}

pub fn tool_call(name: &str, arguments: serde_json::Value) -> Result<ChatCompletion, String> {
    Ok(ChatCompletion::with_tool_calls(
        None,
        vec![ToolCall::new("call-1", name, arguments.to_string())],
    ))
}

pub fn config(workdir: &Path) -> AgentConfig {
    AgentConfig::new("anthropic/claude-sonnet-4", "You are a test assistant.").with_workdir(workdir)
}

/// Agent over `client` with file tools rooted at `workdir` and the session
/// file in `workdir/.session.json`.
pub fn agent(client: &Arc<ScriptedClient>, workdir: &Path) -> Agent {
    agent_with(client, workdir, config(workdir))
}

pub fn agent_with(client: &Arc<ScriptedClient>, workdir: &Path, config: AgentConfig) -> Agent {
    Agent::new(
        Arc::clone(client),
        ToolSet::new().with_file_tools(workdir),
        JsonFileStore::new(workdir.join(".session.json")),
        config,
    )
}

/// Text of the last message in a request.
pub fn last_content(request: &ChatRequest) -> &str {
    request
        .messages
        .last()
        .and_then(|m| m.content.as_deref())
        .unwrap_or_default()
}

pub fn system_prompt(request: &ChatRequest) -> &str {
    let first = &request.messages[0];
    assert_eq!(first.role, MessageRole::System);
    first.content.as_deref().unwrap_or_default()
}
