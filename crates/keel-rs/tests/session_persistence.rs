//! Session state carried across agent instances through the JSON store.

mod common;

use common::*;
use keel_rs::prelude::*;
use serde_json::json;

#[tokio::test]
async fn session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
    let client = ScriptedClient::new([
        tool_call("read_file", json!({"path": "main.rs"})),
        text("It is an empty main."),
    ]);

    let mut first = agent(&client, dir.path());
    first.set_current_task("review main.rs");
    first.set_bookmark("root", dir.path().to_path_buf());
    first.process_message("look at main.rs").await.unwrap();
    first.shutdown().await;
    let saved_id = first.session().session_id().to_string();
    drop(first);

    let client = ScriptedClient::new([text("Still here.")]);
    let mut second = agent(&client, dir.path());
    let session = second.session();
    assert_eq!(session.session_id(), saved_id);
    assert_eq!(session.current_task(), "review main.rs");
    assert_eq!(session.focused_files(), [dir.path().join("main.rs")]);
    assert_eq!(session.bookmark("root"), Some(dir.path()));

    // Conversation history is not persisted, only the session.
    assert!(second.window().is_empty());
    second.process_message("anything new?").await.unwrap();
    assert!(system_prompt(&client.requests()[0]).contains("Current Task: review main.rs"));
    second.shutdown().await;
}

#[tokio::test]
async fn loaded_session_moves_to_new_workdir() {
    let store_dir = tempfile::tempdir().unwrap();
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();
    std::fs::write(second_dir.path().join("Cargo.toml"), "[package]\n").unwrap();
    let store_path = store_dir.path().join("session.json");

    let client = ScriptedClient::new([text("ok")]);
    let mut first = Agent::new(
        std::sync::Arc::clone(&client),
        ToolSet::new(),
        JsonFileStore::new(&store_path),
        config(first_dir.path()),
    );
    first.set_current_task("port the parser");
    first.persist_session();
    first.shutdown().await;

    let second = Agent::new(
        std::sync::Arc::clone(&client),
        ToolSet::new(),
        JsonFileStore::new(&store_path),
        config(second_dir.path()),
    );
    assert_eq!(second.session().working_dir(), second_dir.path());
    assert_eq!(second.session().current_task(), "port the parser");
    assert_eq!(second.session().project_root(), Some(second_dir.path()));
    assert_eq!(second.session().project_type(), Some(ProjectType::Rust));
}

#[tokio::test]
async fn corrupt_session_file_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".session.json"), "{ not json").unwrap();

    let client = ScriptedClient::new([text("fresh start")]);
    let mut agent = agent(&client, dir.path());
    assert!(!agent.session().has_current_task());
    assert!(agent.session().focused_files().is_empty());

    assert_eq!(agent.process_message("hi").await.unwrap(), "fresh start");
    agent.shutdown().await;

    // The next save replaced the corrupt file.
    let reloaded = JsonFileStore::new(dir.path().join(".session.json")).load().unwrap();
    assert_eq!(reloaded.session_id(), agent.session().session_id());
}

#[tokio::test]
async fn failed_turn_does_not_persist() {
    let dir = tempfile::tempdir().unwrap();
    let client = ScriptedClient::new([
        tool_call("read_file", json!({"path": "a.txt"})),
        Err("rate limited".to_string()),
    ]);
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();

    let mut agent = agent(&client, dir.path());
    assert!(agent.process_message("read a.txt").await.is_err());
    agent.shutdown().await;

    let store = JsonFileStore::new(dir.path().join(".session.json"));
    let err = store.load().unwrap_err();
    assert!(err.is_not_found(), "{err}");
}
