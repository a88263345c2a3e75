// crates/cweb-store/src/memory.rs
//
// In-memory storage substrate: a value set per `(domain, slot)` address.
//
// Values keep insertion order. Every write goes through the slot lock and the
// admission gate; reads never block on writers to other slots.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use cweb_core::{
    ConflictFn, CwebError, CwebId, DhtStorage, DomainKey, IncomingDataValidator, PutOutcome,
};

use crate::gate::AdmissionGate;
use crate::locks::SlotLocks;

/// Process-local substrate used for tests and single-node runs.
#[derive(Debug, Default)]
pub struct InMemoryDht {
    slots: RwLock<HashMap<(DomainKey, CwebId), Vec<Vec<u8>>>>,
    locks: SlotLocks,
    gate: AdmissionGate,
}

impl InMemoryDht {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the admission validator. May be called once.
    pub fn install_validator(
        &self,
        validator: Arc<dyn IncomingDataValidator>,
    ) -> Result<(), CwebError> {
        self.gate.install(validator)
    }

    /// Total number of values across all addresses.
    pub async fn len(&self) -> usize {
        self.slots.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DhtStorage for InMemoryDht {
    async fn put_unless(
        &self,
        domain: &DomainKey,
        slot: &CwebId,
        value: Vec<u8>,
        conflicts: ConflictFn<'_>,
    ) -> Result<PutOutcome, CwebError> {
        let _guard = self.locks.lock(domain, slot).await;

        let existing = self.get(domain, slot).await?;
        if existing.iter().any(|v| *v == value) {
            return Ok(PutOutcome::AlreadyPresent);
        }
        if existing.iter().any(|v| conflicts(v)) {
            debug!("Collision at {}/{}: write refused", domain, slot);
            return Ok(PutOutcome::Collision);
        }
        if !self.gate.admit(domain, &value).await {
            debug!("Admission refused write at {}/{}", domain, slot);
            return Ok(PutOutcome::Rejected);
        }

        self.slots
            .write()
            .await
            .entry((*domain, *slot))
            .or_default()
            .push(value);
        Ok(PutOutcome::Stored)
    }

    async fn get(&self, domain: &DomainKey, slot: &CwebId) -> Result<Vec<Vec<u8>>, CwebError> {
        Ok(self
            .slots
            .read()
            .await
            .get(&(*domain, *slot))
            .cloned()
            .unwrap_or_default())
    }
}
