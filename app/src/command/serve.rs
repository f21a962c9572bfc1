use leadbot_config::Config;
use leadbot_core::MessageSender;
use leadbot_whatsapp::{CloudApiSender, WebhookServer, WebhookSettings, WebhookState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Input for the webhook server command.
pub struct ServeInput {
    pub config_path: Option<PathBuf>,
    /// Optional port (overrides config and `PORT`)
    pub port: Option<u16>,
}

/// Strategy for running the WhatsApp Cloud API webhook server.
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load_or_default(input.config_path.as_deref())?;
        if let Some(port) = input.port {
            config.server.port = port;
        }
        config.validate_cloud()?;

        info!("Starting webhook server (mode: cloud)...");

        let sender: Arc<dyn MessageSender> = Arc::new(CloudApiSender::from_config(&config.whatsapp)?);
        let engine = super::build_engine(&config, sender);

        let state = WebhookState::new(engine, WebhookSettings::from_config(&config.whatsapp));
        let server = WebhookServer::new(config.server.bind_address(), state);

        info!("Bot is running. Press Ctrl+C to stop.");
        server.run().await?;

        Ok(())
    }
}
