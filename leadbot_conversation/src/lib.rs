#![warn(
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

//! Lead intake conversation engine.
//!
//! Given an inbound text and the contact's stored session, decide the reply
//! and the next state. The decision itself is the pure [`next_turn`]; the
//! [`IntakeEngine`] wraps it with storage, delivery and per-contact locking.
//!
//! # Flow
//! - `menu` (any casing) or a fresh contact: main menu, `AWAITING_PURPOSE`
//! - `AWAITING_PURPOSE`: catalog hit moves to `AWAITING_DETAILS`, miss repeats
//! - `AWAITING_DETAILS`: the text becomes the details, `DONE`
//! - `DONE`: the session is closed until `menu` is sent

mod locks;
mod manager;
mod turn;

pub use locks::ContactLocks;
pub use manager::{EngineError, IntakeEngine, Outcome};
pub use turn::{Branch, Turn, next_turn};
