// crates/cweb-store/src/locks.rs
//
// Per-slot mutual exclusion for the check-then-append sequence of a write.
//
// Each `(domain, slot)` address gets its own async mutex, created on first
// use. Entries that nobody holds or waits on are dropped once the table grows
// past `PRUNE_THRESHOLD`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use cweb_core::{CwebId, DomainKey};

const PRUNE_THRESHOLD: usize = 1024;

/// Table of per-address async locks.
#[derive(Debug, Default)]
pub struct SlotLocks {
    inner: Mutex<HashMap<(DomainKey, CwebId), Arc<AsyncMutex<()>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one address. Held until the guard is dropped.
    pub async fn lock(&self, domain: &DomainKey, slot: &CwebId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut table = self.inner.lock().unwrap_or_else(|p| p.into_inner());
            if table.len() > PRUNE_THRESHOLD {
                // Only the table holds these: no guard, no waiter.
                table.retain(|_, m| Arc::strong_count(m) > 1);
            }
            table.entry((*domain, *slot)).or_default().clone()
        };
        mutex.lock_owned().await
    }

    /// Number of addresses currently tracked.
    pub fn tracked(&self) -> usize {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_slot_is_exclusive() {
        let locks = Arc::new(SlotLocks::new());
        let domain = DomainKey::vote();
        let slot = CwebId::truncate(b"slot");

        let guard = locks.lock(&domain, &slot).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _g = locks.lock(&domain, &slot).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_slots_do_not_block() {
        let locks = SlotLocks::new();
        let domain = DomainKey::vote();
        let _a = locks.lock(&domain, &CwebId::truncate(b"a")).await;
        let _b = locks.lock(&domain, &CwebId::truncate(b"b")).await;
        let _c = locks.lock(&DomainKey::user(), &CwebId::truncate(b"a")).await;
        assert_eq!(locks.tracked(), 3);
    }

    #[tokio::test]
    async fn idle_entries_are_pruned() {
        let locks = SlotLocks::new();
        let domain = DomainKey::user();
        for i in 0..(PRUNE_THRESHOLD as u32 + 10) {
            let _g = locks.lock(&domain, &CwebId::truncate(&i.to_be_bytes())).await;
        }
        assert!(locks.tracked() <= PRUNE_THRESHOLD + 1);
    }
}
