use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::webhook::{WebhookState, router};
use crate::{Error, Result};

/// HTTP server exposing the webhook and health endpoints.
pub struct WebhookServer {
    addr: String,
    state: WebhookState,
}

impl WebhookServer {
    #[must_use]
    pub const fn new(addr: String, state: WebhookState) -> Self {
        Self { addr, state }
    }

    /// Serve until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|source| Error::Bind {
                addr: self.addr.clone(),
                source,
            })?;

        info!("Webhook server listening on {}", listener.local_addr()?);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Webhook server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
