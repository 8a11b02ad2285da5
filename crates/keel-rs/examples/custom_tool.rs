//! Register a domain tool next to the built-in file tools.
//!
//! # Usage
//!
//! ```bash
//! OPENROUTER_KEY=sk-... cargo run --example custom_tool
//! ```

use keel_rs::prelude::*;
use keel_rs::schemars::{self, JsonSchema};
use serde::Deserialize;

/// Arguments for the `count_lines` tool.
#[derive(Deserialize, JsonSchema)]
struct CountLinesArgs {
    /// Text to count lines in.
    text: String,
}

struct CountLines;

impl Tool for CountLines {
    fn definition(&self) -> ToolDef {
        ToolDef::new(
            "count_lines",
            "Count the lines in a piece of text.",
            json_schema_for::<CountLinesArgs>(),
        )
    }

    fn execute(&self, arguments: &str) -> ToolFuture<'_> {
        let parsed = parse_tool_args::<CountLinesArgs>(arguments);
        Box::pin(async move {
            let args = parsed?;
            Ok(format!("{} lines", args.text.lines().count()))
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let api_key = std::env::var("OPENROUTER_KEY")
        .map_err(|_| "Set OPENROUTER_KEY env var to your OpenRouter API key")?;
    let client = OpenRouterClient::new(api_key)?;

    let tools = ToolSet::new()
        .with_arg_validation(true)
        .with_file_tools(".")
        .with(CountLines);

    let mut agent = Agent::new(
        client,
        tools,
        JsonFileStore::at_default_location(),
        AgentConfig::new(DEFAULT_MODEL, "You are a helpful assistant."),
    );
    let reply = agent
        .process_message("How many lines does Cargo.toml have? Read it, then count.")
        .await
        .map_err(|e| e.to_string())?;
    println!("{reply}");

    agent.shutdown().await;
    Ok(())
}
