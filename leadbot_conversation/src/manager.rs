//! Intake engine: the single entry point transports call per inbound message.

use crate::locks::ContactLocks;
use crate::turn::{Branch, next_turn};
use leadbot_core::{
    ContactState, MessageSender, Playbook, SendError, SendFailurePolicy, SessionStore,
    normalize_text,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced to the transport that delivered the message.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The reply was not delivered. `committed` is true when the transition
    /// was stored anyway under [`SendFailurePolicy::Commit`].
    #[error("failed to send reply: {source}")]
    Send {
        #[source]
        source: SendError,
        committed: bool,
    },

    #[error("session storage error: {0}")]
    Store(anyhow::Error),
}

impl EngineError {
    /// Whether handling the same message again replays the same turn.
    ///
    /// False once a transition was committed: a redelivery would be matched
    /// against the new state.
    #[must_use]
    pub const fn is_replayable(&self) -> bool {
        match self {
            Self::Send { committed, .. } => !*committed,
            Self::Store(_) => true,
        }
    }
}

/// What the engine did with an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Empty contact id or empty text: nothing sent, nothing stored.
    Ignored,
    /// A reply was sent; `state` is the contact's state afterwards.
    Replied { branch: Branch, state: ContactState },
}

pub struct IntakeEngine {
    playbook: Arc<Playbook>,
    store: Arc<dyn SessionStore>,
    sender: Arc<dyn MessageSender>,
    locks: ContactLocks,
    send_failure: SendFailurePolicy,
}

impl IntakeEngine {
    pub fn new(
        playbook: Arc<Playbook>,
        store: Arc<dyn SessionStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        info!(
            "Creating IntakeEngine with {} purposes",
            playbook.purposes.len()
        );
        Self {
            playbook,
            store,
            sender,
            locks: ContactLocks::new(),
            send_failure: SendFailurePolicy::default(),
        }
    }

    #[must_use]
    pub const fn with_send_failure_policy(mut self, policy: SendFailurePolicy) -> Self {
        self.send_failure = policy;
        self
    }

    #[must_use]
    pub fn playbook(&self) -> &Playbook {
        &self.playbook
    }

    /// Process one inbound text message from `contact_id`.
    ///
    /// The text is normalized here, so transports may pass it raw. Exactly one
    /// reply is sent per non-ignored message; the session is merged after the
    /// send, subject to the configured [`SendFailurePolicy`]. Check
    /// [`EngineError::is_replayable`] before asking for a redelivery.
    pub async fn handle_message(
        &self,
        contact_id: &str,
        raw_text: &str,
        display_name: &str,
    ) -> Result<Outcome, EngineError> {
        let text = normalize_text(raw_text);
        if contact_id.trim().is_empty() || text.is_empty() {
            debug!("Ignoring message with empty contact id or text");
            return Ok(Outcome::Ignored);
        }

        let _guard = self.locks.acquire(contact_id).await;

        let session = self
            .store
            .get(contact_id)
            .await
            .map_err(EngineError::Store)?;
        let turn = next_turn(&session, &text, display_name, &self.playbook);

        debug!(
            "[{contact_id}] state={} branch={:?}",
            session.state, turn.branch
        );

        let sent = self.sender.send(contact_id, &turn.reply).await;
        if let Err(e) = &sent {
            warn!("[{contact_id}] Failed to send {:?} reply: {e}", turn.branch);
        }

        let (state, committed) = match turn.patch {
            Some(patch) if sent.is_ok() || self.send_failure == SendFailurePolicy::Commit => {
                let merged = self
                    .store
                    .merge(contact_id, patch)
                    .await
                    .map_err(EngineError::Store)?;
                (merged.state, true)
            }
            Some(_) => {
                warn!(
                    "[{contact_id}] Transition discarded, session stays {}",
                    session.state
                );
                (session.state, false)
            }
            None => (session.state, false),
        };

        sent.map_err(|source| EngineError::Send { source, committed })?;

        info!("[{contact_id}] {:?} -> {state}", turn.branch);
        Ok(Outcome::Replied {
            branch: turn.branch,
            state,
        })
    }
}
