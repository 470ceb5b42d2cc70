// src/live.rs
//
// Process-wide change feed. Every successful write and every session change
// bumps the revision; live subscriptions wake up and re-read their scope.

use std::sync::Arc;

use tokio::sync::watch;

#[derive(Clone)]
pub struct ChangeFeed {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, reason: &'static str) {
        self.tx.send_modify(|rev| *rev += 1);
        tracing::debug!(reason, revision = *self.tx.borrow(), "change published");
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.tx.borrow()
    }
}
