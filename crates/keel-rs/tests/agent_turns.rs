//! Agent turn loop driven by a scripted model client.

mod common;

use common::*;
use keel_rs::prelude::*;
use serde_json::json;

#[tokio::test]
async fn plain_reply_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([text("Hi! How can I help?")]);
    let mut agent = agent(&client, dir.path());

    let reply = agent.process_message("  hello  ").await.unwrap();
    assert_eq!(reply, "Hi! How can I help?");

    let messages = agent.window().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role(), MessageRole::User);
    assert_eq!(messages[0].content(), "hello");
    assert_eq!(messages[1].role(), MessageRole::Assistant);

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    let prompt = system_prompt(&requests[0]);
    assert!(prompt.starts_with("You are a test assistant."));
    assert!(prompt.contains("## Available Tools\n\n- list_directory: "));
    assert_eq!(last_content(&requests[0]), "hello");
    assert_eq!(requests[0].max_tokens, 4000);
    assert!(requests[0].tools.as_ref().is_some_and(|t| t.len() == 3));
    agent.shutdown().await;
}

#[tokio::test]
async fn empty_input_never_reaches_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([]);
    let mut agent = agent(&client, dir.path());

    let err = agent.process_message("   \n").await.unwrap_err();
    assert!(matches!(err, AgentError::EmptyInput));
    assert_eq!(client.request_count(), 0);
    assert!(agent.window().is_empty());
}

#[tokio::test]
async fn tool_calls_feed_results_back_and_track_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), "remember the milk").unwrap();
    let client = ScriptedClient::new([
        tool_call("read_file", json!({"path": "notes.txt"})),
        text("The note says to remember the milk."),
    ]);
    let mut agent = agent(&client, dir.path());

    let reply = agent.process_message("what's in notes.txt?").await.unwrap();
    assert_eq!(reply, "The note says to remember the milk.");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    let results = last_content(&requests[1]);
    assert!(results.starts_with("Tool execution results:\nTool read_file succeeded:\n"), "{results}");
    assert!(results.contains("remember the milk"));

    let notes = dir.path().join("notes.txt");
    assert_eq!(agent.session().focused_files(), [notes.clone()]);
    assert_eq!(agent.session().recent_files(), [notes]);
    assert!(system_prompt(&requests[1]).contains("Recently Active Files:\n  1. "));
    assert!(!system_prompt(&requests[0]).contains("Recently Active Files:"));
    agent.shutdown().await;
}

#[tokio::test]
async fn failed_tool_is_reported_but_not_tracked() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([
        tool_call("read_file", json!({"path": "missing.txt"})),
        text("That file does not exist."),
    ]);
    let mut agent = agent(&client, dir.path());

    agent.process_message("read missing.txt").await.unwrap();
    let results = last_content(&client.requests()[1]).to_string();
    assert!(results.starts_with("Tool execution results:\nTool read_file failed: "), "{results}");
    assert!(agent.session().focused_files().is_empty());
    agent.shutdown().await;
}

#[tokio::test]
async fn unknown_tool_is_reported_to_the_model() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([
        tool_call("launch_rockets", json!({})),
        text("I can't do that."),
    ]);
    let mut agent = agent(&client, dir.path());

    assert_eq!(agent.process_message("go").await.unwrap(), "I can't do that.");
    let results = last_content(&client.requests()[1]).to_string();
    assert!(results.contains("Tool launch_rockets failed: "), "{results}");
    agent.shutdown().await;
}

#[tokio::test]
async fn listing_marks_recent_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("src")).unwrap();
    let client = ScriptedClient::new([
        tool_call("list_directory", json!({"path": "src"})),
        text("src is empty."),
    ]);
    let mut agent = agent(&client, dir.path());

    agent.process_message("what's in src?").await.unwrap();
    assert!(agent.session().focused_files().is_empty());
    assert_eq!(agent.session().recent_files(), [dir.path().join("src")]);
    agent.shutdown().await;
}

#[tokio::test]
async fn model_failure_restores_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([text("first answer"), Err("boom".to_string())]);
    let mut agent = agent(&client, dir.path());

    agent.process_message("first question").await.unwrap();
    let window_before = agent.window().messages().to_vec();
    let session_before = agent.session().clone();

    let err = agent.process_message("second question").await.unwrap_err();
    assert_eq!(err.to_string(), "failed to get model response: boom");
    assert_eq!(agent.window().messages(), window_before.as_slice());
    assert_eq!(agent.session(), &session_before);
    agent.shutdown().await;
}

#[tokio::test]
async fn failure_after_tool_round_rolls_back_tracking() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([
        tool_call("write_file", json!({"path": "out.txt", "content": "data"})),
        Err("connection reset".to_string()),
    ]);
    let mut agent = agent(&client, dir.path());

    assert!(agent.process_message("write out.txt").await.is_err());
    assert!(agent.window().is_empty());
    assert!(agent.session().focused_files().is_empty());
    assert!(agent.session().recent_files().is_empty());
    // The tool itself already ran.
    assert_eq!(std::fs::read_to_string(dir.path().join("out.txt")).unwrap(), "data");
}

#[tokio::test]
async fn empty_completion_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([Ok(ChatCompletion::with_tool_calls(None, Vec::new()))]);
    let mut agent = agent(&client, dir.path());

    let err = agent.process_message("hello").await.unwrap_err();
    assert!(matches!(err, AgentError::EmptyResponse));
    assert!(agent.window().is_empty());
}

#[tokio::test]
async fn tool_rounds_are_capped() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([
        tool_call("list_directory", json!({"path": "."})),
        tool_call("list_directory", json!({"path": "."})),
        tool_call("list_directory", json!({"path": "."})),
        text("never sent"),
    ]);
    let config = config(dir.path()).with_max_tool_rounds(2);
    let mut agent = agent_with(&client, dir.path(), config);

    let reply = agent.process_message("loop forever").await.unwrap();
    assert_eq!(reply, "Stopped after 2 tool rounds.");
    assert_eq!(client.request_count(), 3);
    agent.shutdown().await;
}

#[tokio::test]
async fn verbose_mode_includes_intermediate_text() {
    let script = || {
        [
            Ok(ChatCompletion::with_tool_calls(
                Some("Let me look around.".into()),
                vec![ToolCall::new("c1", "list_directory", r#"{"path":"."}"#)],
            )),
            text("Nothing interesting here."),
        ]
    };

    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new(script());
    let mut quiet = agent(&client, dir.path());
    assert_eq!(
        quiet.process_message("look").await.unwrap(),
        "Nothing interesting here."
    );
    quiet.shutdown().await;

    let client = ScriptedClient::new(script());
    let mut verbose = agent(&client, dir.path());
    verbose.set_verbose(true);
    assert_eq!(
        verbose.process_message("look").await.unwrap(),
        "Let me look around.\n\nNothing interesting here."
    );
    verbose.shutdown().await;
}

#[tokio::test]
async fn switching_model_resizes_window() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([text("ok")]);
    let mut agent = agent(&client, dir.path());
    assert_eq!(agent.window().max_tokens(), 200_000);

    agent.set_model("meta-llama/llama-3.1-8b-instruct");
    assert_eq!(agent.window().max_tokens(), 32_000);

    agent.process_message("hi").await.unwrap();
    assert_eq!(client.requests()[0].model, "meta-llama/llama-3.1-8b-instruct");
    agent.shutdown().await;
}

#[tokio::test]
async fn no_tools_means_no_tool_section() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([text("ok")]);
    let mut agent = Agent::new(
        std::sync::Arc::clone(&client),
        ToolSet::new(),
        JsonFileStore::new(dir.path().join("s.json")),
        config(dir.path()),
    );

    agent.process_message("hi").await.unwrap();
    let request = &client.requests()[0];
    assert!(request.tools.is_none());
    assert!(!system_prompt(request).contains("## Available Tools"));
    agent.shutdown().await;
}

#[tokio::test]
async fn commands_run_against_the_agent() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([text("ok")]);
    let mut agent = agent(&client, dir.path());
    let registry = CommandRegistry::with_defaults();

    let reply = registry.execute("/task fix the build", &mut agent);
    assert_eq!(
        reply,
        Some(Ok(CommandOutcome::Reply("Set current task: fix the build".into())))
    );
    agent.process_message("go").await.unwrap();
    assert!(system_prompt(&client.requests()[0]).contains("Current Task: fix the build"));

    registry.execute("/clear", &mut agent);
    assert!(agent.window().is_empty());
    assert_eq!(agent.session().current_task(), "fix the build");
    agent.shutdown().await;
}
