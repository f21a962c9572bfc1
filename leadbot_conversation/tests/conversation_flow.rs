//! Integration tests for the intake engine.
//!
//! These tests verify that:
//! - The literal intake scenario produces the expected replies and sessions
//! - `menu` restarts from any state without clearing recorded fields
//! - Closed sessions and invalid options never mutate the store
//! - Send and store failures surface to the caller
//! - Concurrent messages for one contact are serialized

use async_trait::async_trait;
use leadbot_conversation::{Branch, EngineError, IntakeEngine, Outcome};
use leadbot_core::{
    ContactState, MessageSender, Playbook, SendError, SendFailurePolicy, Session, SessionPatch,
    SessionStore,
};
use leadbot_session::InMemorySessionStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

const CONTACT: &str = "5511999999999";

#[derive(Default)]
struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl RecordingSender {
    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn replies(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    async fn last_reply(&self) -> String {
        self.replies().await.pop().unwrap_or_default()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, contact_id: &str, text: &str) -> Result<(), SendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(SendError::Rejected {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.sent
            .lock()
            .await
            .push((contact_id.to_string(), text.to_string()));
        Ok(())
    }
}

struct BrokenStore;

#[async_trait]
impl SessionStore for BrokenStore {
    async fn get(&self, _contact_id: &str) -> anyhow::Result<Session> {
        anyhow::bail!("storage unavailable")
    }

    async fn merge(&self, _contact_id: &str, _patch: SessionPatch) -> anyhow::Result<Session> {
        anyhow::bail!("storage unavailable")
    }
}

fn engine(store: Arc<InMemorySessionStore>, sender: Arc<RecordingSender>) -> IntakeEngine {
    IntakeEngine::new(Arc::new(Playbook::default()), store, sender)
}

async fn session(store: &InMemorySessionStore) -> Session {
    store.get(CONTACT).await.unwrap_or_default()
}

#[tokio::test]
async fn test_full_intake_scenario() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender.clone());
    let playbook = Playbook::default();

    let outcome = engine.handle_message(CONTACT, "oi", "Ana").await;
    assert!(matches!(
        outcome,
        Ok(Outcome::Replied {
            branch: Branch::Menu,
            state: ContactState::AwaitingPurpose
        })
    ));
    assert!(sender.last_reply().await.starts_with("Olá, Ana! 👋"));

    engine.handle_message(CONTACT, "2", "Ana").await.ok();
    let s = session(&store).await;
    assert_eq!(s.state, ContactState::AwaitingDetails);
    assert_eq!(s.purpose.as_deref(), Some("Agendar reunião"));
    assert!(sender.last_reply().await.contains("dia/horário"));

    engine
        .handle_message(CONTACT, "terça 10h, revisão de contrato", "Ana")
        .await
        .ok();
    let s = session(&store).await;
    assert_eq!(s.state, ContactState::Done);
    assert_eq!(s.details.as_deref(), Some("terça 10h, revisão de contrato"));
    assert_eq!(sender.last_reply().await, playbook.closing);

    let outcome = engine.handle_message(CONTACT, "oi", "Ana").await;
    assert!(matches!(
        outcome,
        Ok(Outcome::Replied {
            branch: Branch::SessionClosed,
            state: ContactState::Done
        })
    ));
    assert_eq!(sender.last_reply().await, playbook.session_closed);

    engine.handle_message(CONTACT, "menu", "Ana").await.ok();
    let s = session(&store).await;
    assert_eq!(s.state, ContactState::AwaitingPurpose);
    assert_eq!(s.purpose.as_deref(), Some("Agendar reunião"));
    assert_eq!(s.details.as_deref(), Some("terça 10h, revisão de contrato"));

    assert_eq!(sender.replies().await.len(), 5);
}

#[tokio::test]
async fn test_menu_keyword_ignores_casing_and_whitespace() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender.clone());

    engine.handle_message(CONTACT, "oi", "").await.ok();
    engine.handle_message(CONTACT, "1", "").await.ok();

    for text in ["Menu", " menu ", "MENU\n"] {
        let outcome = engine.handle_message(CONTACT, text, "").await;
        assert!(matches!(
            outcome,
            Ok(Outcome::Replied {
                branch: Branch::Menu,
                state: ContactState::AwaitingPurpose
            })
        ));
        assert!(sender.last_reply().await.starts_with("Olá! 👋"));
    }
}

#[tokio::test]
async fn test_details_are_normalized_text() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender);

    engine.handle_message(CONTACT, "oi", "").await.ok();
    engine.handle_message(CONTACT, " 3 ", "").await.ok();
    engine
        .handle_message(CONTACT, "  Reforma de Cozinha, Curitiba/PR  ", "")
        .await
        .ok();

    let s = session(&store).await;
    assert_eq!(s.purpose.as_deref(), Some("Solicitar orçamento"));
    assert_eq!(s.details.as_deref(), Some("reforma de cozinha, curitiba/pr"));
}

#[tokio::test]
async fn test_invalid_option_keeps_session() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender.clone());

    engine.handle_message(CONTACT, "oi", "").await.ok();
    let before = session(&store).await;

    let outcome = engine.handle_message(CONTACT, "9", "").await;
    assert!(matches!(
        outcome,
        Ok(Outcome::Replied {
            branch: Branch::InvalidOption,
            state: ContactState::AwaitingPurpose
        })
    ));
    assert_eq!(session(&store).await, before);
    assert_eq!(sender.last_reply().await, Playbook::default().invalid_option);
}

#[tokio::test]
async fn test_closed_session_is_idempotent() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender.clone());

    for text in ["oi", "1", "projeto 42, atraso na obra"] {
        engine.handle_message(CONTACT, text, "").await.ok();
    }
    let done = session(&store).await;

    for text in ["oi", "1", "ainda aguardando"] {
        engine.handle_message(CONTACT, text, "").await.ok();
        assert_eq!(session(&store).await, done);
    }
    assert_eq!(
        sender.last_reply().await,
        Playbook::default().session_closed
    );
}

#[tokio::test]
async fn test_empty_input_is_ignored() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender.clone());

    assert!(matches!(
        engine.handle_message(CONTACT, "   ", "Ana").await,
        Ok(Outcome::Ignored)
    ));
    assert!(matches!(
        engine.handle_message("", "oi", "Ana").await,
        Ok(Outcome::Ignored)
    ));
    assert!(sender.replies().await.is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_send_failure_commits_by_default() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender.clone());

    sender.fail(true);
    let outcome = engine.handle_message(CONTACT, "oi", "").await;

    assert!(matches!(
        outcome,
        Err(EngineError::Send {
            committed: true,
            ..
        })
    ));
    assert!(outcome.is_err_and(|e| !e.is_replayable()));
    assert_eq!(session(&store).await.state, ContactState::AwaitingPurpose);
}

#[tokio::test]
async fn test_send_failure_rolls_back_when_configured() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine =
        engine(store.clone(), sender.clone()).with_send_failure_policy(SendFailurePolicy::Rollback);

    engine.handle_message(CONTACT, "oi", "").await.ok();

    sender.fail(true);
    let outcome = engine.handle_message(CONTACT, "2", "").await;
    assert!(matches!(
        outcome,
        Err(EngineError::Send {
            committed: false,
            ..
        })
    ));
    assert!(outcome.is_err_and(|e| e.is_replayable()));
    assert_eq!(session(&store).await.state, ContactState::AwaitingPurpose);
    assert!(session(&store).await.purpose.is_none());

    sender.fail(false);
    engine.handle_message(CONTACT, "2", "").await.ok();
    assert_eq!(session(&store).await.state, ContactState::AwaitingDetails);
}

#[tokio::test]
async fn test_store_failure_is_propagated() {
    let sender = Arc::new(RecordingSender::default());
    let engine = IntakeEngine::new(
        Arc::new(Playbook::default()),
        Arc::new(BrokenStore),
        sender.clone(),
    );

    let outcome = engine.handle_message(CONTACT, "oi", "").await;
    assert!(matches!(outcome, Err(EngineError::Store(_))));
    assert!(outcome.is_err_and(|e| e.is_replayable()));
    assert!(sender.replies().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_messages_for_one_contact_are_serialized() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::slow(Duration::from_millis(20)));
    let engine = Arc::new(engine(store.clone(), sender.clone()));

    engine.handle_message(CONTACT, "oi", "").await.ok();

    let first = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.handle_message(CONTACT, "1", "").await }
    });
    let second = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.handle_message(CONTACT, "2", "").await }
    });
    let (first, second) = (first.await, second.await);
    assert!(matches!(first, Ok(Ok(_))));
    assert!(matches!(second, Ok(Ok(_))));

    // One message picked the purpose, the other became the details.
    let s = session(&store).await;
    assert_eq!(s.state, ContactState::Done);
    let purpose = s.purpose.unwrap_or_default();
    let details = s.details.unwrap_or_default();
    assert!(
        (purpose == "Projeto em andamento" && details == "2")
            || (purpose == "Agendar reunião" && details == "1"),
        "purpose={purpose} details={details}"
    );

    let playbook = Playbook::default();
    let replies = sender.replies().await;
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[2], playbook.closing);
}

#[tokio::test]
async fn test_different_contacts_do_not_share_state() {
    let store = Arc::new(InMemorySessionStore::new());
    let sender = Arc::new(RecordingSender::default());
    let engine = engine(store.clone(), sender);

    engine.handle_message("a", "oi", "").await.ok();
    engine.handle_message("a", "1", "").await.ok();
    engine.handle_message("b", "1", "").await.ok();

    let a = store.get("a").await.unwrap_or_default();
    let b = store.get("b").await.unwrap_or_default();
    assert_eq!(a.state, ContactState::AwaitingDetails);
    assert_eq!(b.state, ContactState::AwaitingPurpose);
    assert!(b.purpose.is_none());
}
