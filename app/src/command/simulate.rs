//! Terminal transport for trying the intake flow without WhatsApp.
//!
//! Each stdin line is one inbound message from `--contact`; replies are
//! printed instead of sent.

use async_trait::async_trait;
use leadbot_config::Config;
use leadbot_conversation::{IntakeEngine, Outcome};
use leadbot_core::{MessageSender, SendError};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Prints replies to stdout.
struct ConsoleSender;

#[async_trait]
impl MessageSender for ConsoleSender {
    async fn send(&self, _contact_id: &str, text: &str) -> Result<(), SendError> {
        let mut stdout = tokio::io::stdout();
        let output = format!("\n🤖 {}\n\n", text.replace('\n', "\n   "));
        stdout
            .write_all(output.as_bytes())
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}

/// Input parameters for the Simulate command strategy.
#[derive(Debug, Clone)]
pub struct SimulateInput {
    pub config_path: Option<PathBuf>,
    pub contact: String,
    pub name: String,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
}

/// Strategy for chatting with the engine from a terminal.
#[derive(Debug, Clone, Copy)]
pub struct SimulateStrategy;

impl super::CommandStrategy for SimulateStrategy {
    type Input = SimulateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load_or_default(input.config_path.as_deref())?;
        let engine = super::build_engine(&config, Arc::new(ConsoleSender));

        if let Some(msg) = input.message {
            let outcome = engine
                .handle_message(&input.contact, &msg, &input.name)
                .await?;
            info!("Outcome: {outcome:?}");
            return Ok(());
        }

        run_interactive(&engine, &input.contact, &input.name).await
    }
}

async fn run_interactive(engine: &IntakeEngine, contact: &str, name: &str) -> anyhow::Result<()> {
    println!("Simulating contact {contact}. Type /quit to exit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if QUIT_COMMANDS.contains(&line.trim()) {
            break;
        }

        match engine.handle_message(contact, &line, name).await {
            Ok(Outcome::Replied { state, .. }) => {
                println!("   [{state}]");
            }
            Ok(Outcome::Ignored) => {}
            Err(e) => error!("Failed to handle message: {e}"),
        }
    }

    println!("Goodbye!");
    Ok(())
}
