use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per contact id.
///
/// Holding the guard makes a read-modify-write of that contact's session
/// atomic with respect to other events for the same contact, while other
/// contacts proceed in parallel. Waiters are served in FIFO order, so events
/// for one contact are handled in the order they reached the engine.
#[derive(Default)]
pub struct ContactLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ContactLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, contact_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(contact_id.to_owned()).or_default())
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_contact_is_exclusive() {
        let locks = ContactLocks::new();
        let guard = locks.acquire("a").await;

        let blocked = tokio::time::timeout(Duration::from_millis(50), locks.acquire("a")).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(50), locks.acquire("a")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_other_contacts_do_not_wait() {
        let locks = ContactLocks::new();
        let _guard = locks.acquire("a").await;

        let other = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b")).await;
        assert!(other.is_ok());
    }
}
