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

//! WhatsApp Cloud API transport for the intake engine.
//!
//! Receives webhook events, filters them down to plain text messages and
//! hands each one to the engine; replies go out through [`CloudApiSender`].

mod error;
pub mod payload;
pub mod retry;
mod sender;
mod server;
pub mod signature;
mod webhook;

pub use error::{Error, Result};
pub use payload::{InboundText, WebhookPayload, extract_inbound};
pub use sender::CloudApiSender;
pub use server::WebhookServer;
pub use webhook::{WebhookSettings, WebhookState, router};
