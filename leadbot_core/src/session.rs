//! Per-contact conversation state.
//!
//! A [`Session`] only ever grows: updates arrive as a [`SessionPatch`] and
//! fields the patch leaves as `None` keep their previous value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a contact in the intake flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactState {
    #[default]
    New,
    AwaitingPurpose,
    AwaitingDetails,
    Done,
}

impl ContactState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::AwaitingPurpose => "AWAITING_PURPOSE",
            Self::AwaitingDetails => "AWAITING_DETAILS",
            Self::Done => "DONE",
        }
    }
}

impl fmt::Display for ContactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversation state attached to one contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: ContactState,
    /// Label of the selected purpose, set when entering `AwaitingDetails`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    /// Free-text payload, set when entering `Done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Last time a patch was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Overwrite only the fields present in `patch`.
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(state) = patch.state {
            self.state = state;
        }
        if let Some(purpose) = patch.purpose {
            self.purpose = Some(purpose);
        }
        if let Some(details) = patch.details {
            self.details = Some(details);
        }
        self.updated_at = Some(Utc::now());
    }

    /// Consuming variant of [`Session::apply`].
    #[must_use]
    pub fn merged(mut self, patch: SessionPatch) -> Self {
        self.apply(patch);
        self
    }
}

/// Partial update of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ContactState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl SessionPatch {
    #[must_use]
    pub const fn state(state: ContactState) -> Self {
        Self {
            state: Some(state),
            purpose: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
