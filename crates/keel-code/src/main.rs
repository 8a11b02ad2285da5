//! Terminal coding assistant powered by keel-rs.
//!
//! Reads the API key from `OPENROUTER_KEY` (or `OPENROUTER_API_KEY`) unless
//! `~/.keel.toml` sets one. Logs go to stderr, filtered by `KEEL_LOG`.
//! Each invocation runs one turn or one slash command; the session file
//! carries continuity between invocations.
//!
//! # Examples
//!
//! ```sh
//! keel-code --workdir /path/to/project Explain what src/lib.rs does
//! keel-code /task write the release notes
//! keel-code /stats
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use keel_code::dispatch::{self, LineAction};
use keel_code::{CodeConfig, Overrides};
use keel_rs::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Terminal coding assistant powered by keel-rs.
#[derive(Parser)]
#[command(name = "keel-code", version)]
struct Cli {
    /// Model to use for completions.
    #[arg(long)]
    model: Option<String>,

    /// Working directory for file tools and relative paths.
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Config file. Default: ~/.keel.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum tokens per response.
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature.
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tool round-trips per turn.
    #[arg(long)]
    max_tool_rounds: Option<u32>,

    /// Show intermediate replies and debug logs.
    #[arg(long, short)]
    verbose: bool,

    /// Message or slash command to run.
    #[arg(required = true)]
    message: Vec<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("KEEL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match CodeConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let config = config
        .with_overrides(Overrides {
            model: cli.model,
            workdir: cli.workdir,
            max_tokens: cli.max_tokens,
            temperature: cli.temperature,
            max_tool_rounds: cli.max_tool_rounds,
            verbose: cli.verbose,
        })
        .with_env(|k| std::env::var(k).ok());

    let client = match config.client() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            eprintln!("Tip: export OPENROUTER_API_KEY=\"your-key\"");
            return ExitCode::FAILURE;
        }
    };

    let mut agent = Agent::new(
        client,
        config.tool_set(),
        config.session_store(),
        config.agent_config(),
    );
    let registry = CommandRegistry::with_defaults();

    let line = cli.message.join(" ");
    let mut stdout = std::io::stdout();
    let code = match dispatch::handle_line(&mut agent, &registry, &line, &mut stdout).await {
        Ok(LineAction::Continue | LineAction::Exit) => ExitCode::SUCCESS,
        Ok(LineAction::Failed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    };

    agent.shutdown().await;
    code
}
