use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type Slots = Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>;

fn lock(slots: &Slots) -> MutexGuard<'_, HashMap<Uuid, Arc<AsyncMutex<()>>>> {
    slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One async mutex per user. Serializes the dedup-check-then-persist step
/// between the meal-saved and session-start triggers.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Slots,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: Uuid) -> UserLockGuard {
        let slot = lock(&self.inner).entry(user_id).or_default().clone();
        let guard = slot.clone().lock_owned().await;
        UserLockGuard {
            guard: Some(guard),
            slot,
            user_id,
            slots: self.inner.clone(),
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        lock(&self.inner).len()
    }
}

/// Held for the duration of one user's check. Drops the user's slot from the
/// registry once nobody else holds or waits on it.
pub struct UserLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    slot: Arc<AsyncMutex<()>>,
    user_id: Uuid,
    slots: Slots,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = lock(&self.slots);
        // map entry plus our own handle; waiters clone under the map lock
        let idle = map
            .get(&self.user_id)
            .is_some_and(|s| Arc::ptr_eq(s, &self.slot) && Arc::strong_count(s) == 2);
        if idle {
            map.remove(&self.user_id);
        }
    }
}
