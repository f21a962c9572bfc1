use async_trait::async_trait;
use leadbot_config::WhatsAppConfig;
use leadbot_core::{MessageSender, SendError};
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::Result;
use crate::retry::retry_with_backoff;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Outbound text delivery through the WhatsApp Cloud API.
#[derive(Clone)]
pub struct CloudApiSender {
    client: Client,
    access_token: String,
    messages_url: String,
    retry_delays: Vec<Duration>,
}

impl CloudApiSender {
    pub fn new(access_token: String, phone_number_id: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        info!("Creating CloudApiSender for phone number id {phone_number_id}");
        Ok(Self {
            client,
            access_token,
            messages_url: Self::build_url("https://graph.facebook.com", "v21.0", phone_number_id),
            retry_delays: vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)],
        })
    }

    pub fn from_config(config: &WhatsAppConfig) -> Result<Self> {
        Ok(Self::new(config.access_token.clone(), &config.phone_number_id)?
            .with_base_url(&config.api_base_url, &config.api_version, &config.phone_number_id)
            .with_retry_delays(
                config
                    .retry_delays_secs
                    .iter()
                    .map(|s| Duration::from_secs(*s))
                    .collect(),
            ))
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: &str, api_version: &str, phone_number_id: &str) -> Self {
        self.messages_url = Self::build_url(base_url, api_version, phone_number_id);
        self
    }

    #[must_use]
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    #[must_use]
    pub fn messages_url(&self) -> &str {
        &self.messages_url
    }

    fn build_url(base_url: &str, api_version: &str, phone_number_id: &str) -> String {
        format!(
            "{}/{}/{}/messages",
            base_url.trim_end_matches('/'),
            api_version.trim_matches('/'),
            phone_number_id
        )
    }

    /// Rate limiting, server-side failures and network errors are transient.
    const fn is_transient(error: &SendError) -> bool {
        match error {
            SendError::Rejected { status, .. } => *status == 429 || *status >= 500,
            SendError::Transport(_) => true,
        }
    }

    async fn try_send(&self, request: &serde_json::Value) -> std::result::Result<(), SendError> {
        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(request)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MessageSender for CloudApiSender {
    async fn send(&self, contact_id: &str, text: &str) -> std::result::Result<(), SendError> {
        let request = json!({
            "messaging_product": "whatsapp",
            "to": contact_id,
            "text": { "body": text },
        });

        debug!("Sending message to {contact_id}");
        retry_with_backoff(
            || self.try_send(&request),
            &self.retry_delays,
            Self::is_transient,
        )
        .await?;
        debug!("Message delivered to {contact_id}");
        Ok(())
    }
}
