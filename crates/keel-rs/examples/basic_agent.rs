//! Minimal agent: one turn with the file tools, then a slash command.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run --example basic_agent
//! ```

use keel_rs::prelude::*;

#[tokio::main]
async fn main() -> Result<(), String> {
    let api_key = std::env::var("OPENROUTER_KEY")
        .map_err(|_| "Set OPENROUTER_KEY env var to your OpenRouter API key")?;
    let client = OpenRouterClient::new(api_key)?;

    let config = AgentConfig::new(
        "anthropic/claude-sonnet-4",
        "You are a helpful coding assistant. Be concise.",
    )
    .with_max_tool_rounds(5);
    let mut agent = Agent::new(
        client,
        ToolSet::new().with_file_tools("."),
        JsonFileStore::at_default_location(),
        config,
    );

    let reply = agent
        .process_message("List the files in the current directory and summarize this project.")
        .await
        .map_err(|e| e.to_string())?;
    println!("{reply}\n");

    let registry = CommandRegistry::with_defaults();
    if let Some(Ok(CommandOutcome::Reply(stats))) = registry.execute("/stats", &mut agent) {
        println!("{stats}");
    }

    agent.shutdown().await;
    Ok(())
}
