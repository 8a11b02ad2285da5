//! Dispatch of one invocation's input.
//!
//! The input is either a slash command, run through the [`CommandRegistry`],
//! or a message for the [`Agent`].

use std::io::Write;

use keel_rs::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAction {
    Continue,
    /// The command or turn failed; the error was written out.
    Failed,
    Exit,
}

/// Handle one line of input, writing the reply or error to `out`.
pub async fn handle_line(
    agent: &mut Agent,
    registry: &CommandRegistry,
    line: &str,
    out: &mut impl Write,
) -> std::io::Result<LineAction> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(LineAction::Continue);
    }

    let action = match registry.execute(line, &mut *agent) {
        Some(Ok(CommandOutcome::Reply(text))) => {
            agent.persist_session();
            writeln!(out, "{text}")?;
            LineAction::Continue
        }
        Some(Ok(CommandOutcome::Exit)) => return Ok(LineAction::Exit),
        Some(Err(e)) => {
            writeln!(out, "Error: {e}")?;
            LineAction::Failed
        }
        None => match agent.process_message(line).await {
            Ok(reply) => {
                writeln!(out, "{reply}")?;
                LineAction::Continue
            }
            Err(e) => {
                writeln!(out, "Error: {e}")?;
                LineAction::Failed
            }
        },
    };
    writeln!(out)?;
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl ModelClient for Echo {
        fn chat<'a>(&'a self, request: &'a ChatRequest) -> keel_rs::api::ChatFuture<'a> {
            Box::pin(async move {
                let last = request
                    .messages
                    .last()
                    .and_then(|m| m.content.clone())
                    .unwrap_or_default();
                Ok(ChatCompletion::text(format!("echo: {last}")))
            })
        }
    }

    fn agent(dir: &std::path::Path) -> Agent {
        Agent::new(
            Echo,
            ToolSet::new(),
            JsonFileStore::new(dir.join("session.json")),
            AgentConfig::new("anthropic/claude-sonnet-4", "base").with_workdir(dir),
        )
    }

    async fn run(agent: &mut Agent, line: &str) -> (LineAction, String) {
        let registry = CommandRegistry::with_defaults();
        let mut out = Vec::new();
        let action = handle_line(agent, &registry, line, &mut out).await.unwrap();
        (action, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn messages_go_to_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        let (action, out) = run(&mut agent, "hello there").await;
        assert_eq!(action, LineAction::Continue);
        assert_eq!(out, "echo: hello there\n\n");
        agent.shutdown().await;
    }

    #[tokio::test]
    async fn commands_do_not_reach_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        let (_, out) = run(&mut agent, "/task ship it").await;
        assert_eq!(out, "Set current task: ship it\n\n");
        assert!(agent.window().is_empty());
        agent.shutdown().await;

        let saved = JsonFileStore::new(dir.path().join("session.json")).load().unwrap();
        assert_eq!(saved.current_task(), "ship it");
    }

    #[tokio::test]
    async fn command_errors_are_printed() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        let (action, out) = run(&mut agent, "/nope").await;
        assert_eq!(action, LineAction::Failed);
        assert_eq!(out, "Error: unknown command: /nope\n\n");
    }

    #[tokio::test]
    async fn exit_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent(dir.path());
        assert_eq!(run(&mut agent, "   ").await, (LineAction::Continue, String::new()));
        assert_eq!(run(&mut agent, "/exit").await.0, LineAction::Exit);
    }
}
