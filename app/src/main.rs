#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    CommandStrategy, InfoStrategy, InitStrategy, ServeInput, ServeStrategy, SimulateInput,
    SimulateStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "leadbot")]
#[command(about = "WhatsApp lead intake bot", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/leadbot/config.json)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the WhatsApp Cloud API webhook server
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short = 'p', long)]
        port: Option<u16>,
    },
    /// Chat with the intake flow from the terminal
    Simulate {
        /// Contact id the conversation is attributed to
        #[arg(long, default_value = "console")]
        contact: String,

        /// Display name used in the greeting
        #[arg(short = 'n', long, default_value = "")]
        name: String,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            ServeStrategy
                .execute(ServeInput {
                    config_path: cli.config,
                    port,
                })
                .await
        }
        Commands::Simulate {
            contact,
            name,
            message,
        } => {
            SimulateStrategy
                .execute(SimulateInput {
                    config_path: cli.config,
                    contact,
                    name,
                    message,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(cli.config).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
