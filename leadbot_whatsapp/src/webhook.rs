use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use leadbot_config::WhatsAppConfig;
use leadbot_conversation::{IntakeEngine, Outcome};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::payload::{InboundText, WebhookPayload, extract_inbound};
use crate::signature::{SIGNATURE_HEADER, verify_signature};

/// Webhook-side settings taken from [`WhatsAppConfig`].
#[derive(Debug, Clone, Default)]
pub struct WebhookSettings {
    pub verify_token: String,
    pub app_secret: String,
    pub phone_number_id: String,
    pub skip_backlog: bool,
}

impl WebhookSettings {
    #[must_use]
    pub fn from_config(config: &WhatsAppConfig) -> Self {
        Self {
            verify_token: config.verify_token.clone(),
            app_secret: config.app_secret.clone(),
            phone_number_id: config.phone_number_id.clone(),
            skip_backlog: config.skip_backlog,
        }
    }
}

#[derive(Clone)]
pub struct WebhookState {
    engine: Arc<IntakeEngine>,
    settings: Arc<WebhookSettings>,
    /// Unix seconds; messages older than this are backlog.
    started_at: i64,
    /// Message ids claimed by a delivery and not released by a replayable failure.
    seen: Arc<Mutex<HashSet<String>>>,
}

impl WebhookState {
    #[must_use]
    pub fn new(engine: Arc<IntakeEngine>, settings: WebhookSettings) -> Self {
        Self {
            engine,
            settings: Arc::new(settings),
            started_at: chrono::Utc::now().timestamp(),
            seen: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    #[must_use]
    pub const fn with_started_at(mut self, started_at: i64) -> Self {
        self.started_at = started_at;
        self
    }
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify_subscription).post(receive_events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn verify_subscription(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<WebhookState>,
) -> impl IntoResponse {
    let mode = params.get("hub.mode").map_or("", String::as_str);
    let token = params.get("hub.verify_token").map_or("", String::as_str);
    let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
    let expected = state.settings.verify_token.as_str();

    if mode == "subscribe" && !expected.is_empty() && token == expected {
        info!("Webhook subscription verified");
        return (StatusCode::OK, challenge).into_response();
    }

    warn!("Webhook verification rejected (mode={mode:?})");
    StatusCode::FORBIDDEN.into_response()
}

async fn receive_events(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    if !verify_signature(&state.settings.app_secret, signature, &body) {
        warn!("Rejected webhook delivery with invalid signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid webhook signature" })),
        )
            .into_response();
    }

    let payload = match serde_json::from_slice::<WebhookPayload>(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Malformed webhook payload: {e}");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "malformed payload" })),
            )
                .into_response();
        }
    };

    let messages = extract_inbound(&payload, &state.settings.phone_number_id);
    if messages.is_empty() {
        return StatusCode::OK.into_response();
    }

    // Detached so a dropped request cannot cut a turn between send and merge.
    match tokio::spawn(process_delivery(state, messages)).await {
        Ok(0) => StatusCode::OK.into_response(),
        Ok(failed) => {
            warn!("{failed} message(s) left for redelivery");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(e) => {
            error!("Webhook delivery task failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run a delivery's messages in payload order and count the ones that
/// should be redelivered.
async fn process_delivery(state: WebhookState, messages: Vec<InboundText>) -> usize {
    let mut failed = 0usize;
    for message in messages {
        if state.settings.skip_backlog
            && message.timestamp.is_some_and(|ts| ts < state.started_at)
        {
            debug!("Skipping backlog message {}", message.message_id);
            continue;
        }

        let tracked = !message.message_id.is_empty();
        if tracked && !state.seen.lock().await.insert(message.message_id.clone()) {
            debug!("Skipping duplicate message {}", message.message_id);
            continue;
        }

        match state
            .engine
            .handle_message(&message.contact_id, &message.text, &message.display_name)
            .await
        {
            Ok(Outcome::Ignored) => debug!("Message {} ignored", message.message_id),
            Ok(Outcome::Replied { .. }) => {}
            Err(e) if e.is_replayable() => {
                error!(
                    "Failed to process message {} from {}: {e}",
                    message.message_id, message.contact_id
                );
                if tracked {
                    state.seen.lock().await.remove(&message.message_id);
                }
                failed += 1;
            }
            Err(e) => {
                error!(
                    "Reply to message {} from {} was lost, transition kept: {e}",
                    message.message_id, message.contact_id
                );
            }
        }
    }
    failed
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "mode": "cloud" }))
}
