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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod playbook;
pub mod session;
pub mod text;

pub use playbook::{Playbook, PlaybookError, PurposeOption};
pub use session::{ContactState, Session, SessionPatch};
pub use text::{MENU_COMMAND, is_menu_command, normalize_text};

/// Failure reported by an outbound [`MessageSender`].
#[derive(Debug, Error)]
pub enum SendError {
    /// The remote channel answered but refused the message.
    #[error("message rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The request never produced an answer (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
}

/// What happens to a computed transition when its reply could not be sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendFailurePolicy {
    /// Store the transition anyway; the send error is still reported.
    #[default]
    Commit,
    /// Leave the session untouched so the contact's retry replays the turn.
    Rollback,
}

/// Outbound delivery of a single text message to a contact.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, contact_id: &str, text: &str) -> Result<(), SendError>;
}

/// Per-contact conversation state storage.
///
/// `get` never reports a missing contact: unknown ids yield
/// [`Session::default`]. Implementations backed by real storage surface
/// their own failures through the `anyhow::Result`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, contact_id: &str) -> anyhow::Result<Session>;

    /// Shallow-merge `patch` over the stored session (or the default one)
    /// and return the stored result.
    async fn merge(&self, contact_id: &str, patch: SessionPatch) -> anyhow::Result<Session>;
}
