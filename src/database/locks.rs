use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Advisory per-record lock table keyed by `(resource, key)`.
///
/// Held for the duration of a read-modify-write sequence. The guard releases the
/// lock when dropped, so every exit path of the caller unlocks. Only callers that
/// go through the table are serialized; plain store calls are not.
#[derive(Debug, Default)]
pub struct KeyLocks {
    locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

pub type KeyGuard = OwnedMutexGuard<()>;

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, resource: &str, key: &str) -> KeyGuard {
        let entry = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on are only referenced by the table
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry((resource.to_string(), key.to_string()))
                .or_default()
                .clone()
        };
        entry.lock_owned().await
    }

    /// Number of addresses currently tracked
    #[cfg(test)]
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
