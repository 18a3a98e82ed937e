use std::collections::HashMap;
use std::sync::Arc;

use chatkeep_core::models::ConversationId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per conversation, so at most one turn per conversation is
/// in flight in this process. Turns for different conversations never contend.
#[derive(Debug, Default)]
pub struct TurnLocks {
    locks: Mutex<HashMap<ConversationId, Arc<Mutex<()>>>>,
}

impl TurnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. Released when the guard drops.
    pub async fn acquire(&self, id: &ConversationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of conversations with a held or awaited lock.
    pub async fn active(&self) -> usize {
        self.locks
            .lock()
            .await
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}
