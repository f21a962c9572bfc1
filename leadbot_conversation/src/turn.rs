//! The intake state machine as a pure function.

use leadbot_core::{ContactState, Playbook, Session, SessionPatch, is_menu_command};

/// Which conversational branch produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Menu,
    FollowUp,
    InvalidOption,
    Closing,
    SessionClosed,
}

/// Reply and session mutation computed for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub branch: Branch,
    pub reply: String,
    /// `None` for the branches that leave the session untouched.
    pub patch: Option<SessionPatch>,
}

/// Decide the reply and next state for `text`, which must already be normalized.
///
/// Rules are evaluated in priority order: restart/greeting first, then the
/// current state.
#[must_use]
pub fn next_turn(session: &Session, text: &str, display_name: &str, playbook: &Playbook) -> Turn {
    if is_menu_command(text) || session.state == ContactState::New {
        return Turn {
            branch: Branch::Menu,
            reply: playbook.main_menu(display_name),
            patch: Some(SessionPatch::state(ContactState::AwaitingPurpose)),
        };
    }

    match session.state {
        ContactState::AwaitingPurpose => match (playbook.purpose(text), playbook.follow_up(text)) {
            (Some(purpose), Some(follow_up)) => Turn {
                branch: Branch::FollowUp,
                reply: follow_up.to_string(),
                patch: Some(
                    SessionPatch::state(ContactState::AwaitingDetails)
                        .with_purpose(purpose.label.clone()),
                ),
            },
            _ => Turn {
                branch: Branch::InvalidOption,
                reply: playbook.invalid_option.clone(),
                patch: None,
            },
        },
        ContactState::AwaitingDetails => Turn {
            branch: Branch::Closing,
            reply: playbook.closing.clone(),
            patch: Some(SessionPatch::state(ContactState::Done).with_details(text)),
        },
        ContactState::New | ContactState::Done => Turn {
            branch: Branch::SessionClosed,
            reply: playbook.session_closed.clone(),
            patch: None,
        },
    }
}
