// crates/cweb-core/src/traits.rs

use async_trait::async_trait;

use crate::domain::DomainKey;
use crate::error::CwebError;
use crate::id::CwebId;
use crate::proto::SignedUser;

/// Result of a write against the storage substrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The value was admitted and appended to the slot.
    Stored,
    /// The exact value was already present; nothing changed.
    AlreadyPresent,
    /// The value conflicts with a value already at the slot.
    Collision,
    /// The admission validator refused the value.
    Rejected,
}

impl PutOutcome {
    /// True when the value is visible at the slot after the call.
    pub fn is_visible(self) -> bool {
        matches!(self, PutOutcome::Stored | PutOutcome::AlreadyPresent)
    }
}

/// Predicate over an existing raw value at a slot: `true` means the incoming
/// value must not be stored next to it.
pub type ConflictFn<'a> = &'a (dyn Fn(&[u8]) -> bool + Send + Sync);

/// The shared key-value store, addressed by `(domain key, slot)`.
///
/// Implementations hold a set of values per address and must run every
/// inbound write through an `IncomingDataValidator` before it becomes
/// visible to `get`.
#[async_trait]
pub trait DhtStorage: Send + Sync {
    /// Atomically check the slot's current values against `conflicts` and,
    /// if none conflict and the write is admitted, append `value`.
    ///
    /// No other write to the same address may interleave between the check
    /// and the append.
    async fn put_unless(
        &self,
        domain: &DomainKey,
        slot: &CwebId,
        value: Vec<u8>,
        conflicts: ConflictFn<'_>,
    ) -> Result<PutOutcome, CwebError>;

    /// Append `value` to the slot, subject to admission.
    async fn put(
        &self,
        domain: &DomainKey,
        slot: &CwebId,
        value: Vec<u8>,
    ) -> Result<PutOutcome, CwebError> {
        self.put_unless(domain, slot, value, &|_| false).await
    }

    /// All admitted values at the address.
    async fn get(&self, domain: &DomainKey, slot: &CwebId) -> Result<Vec<Vec<u8>>, CwebError>;
}

/// Resolves a public key to the identity record that registered it.
#[async_trait]
pub trait KeyLookup: Send + Sync {
    async fn find_owner(&self, public_key: &[u8]) -> Result<Option<SignedUser>, CwebError>;
}

/// The admission gate a substrate applies to every inbound write.
#[async_trait]
pub trait IncomingDataValidator: Send + Sync {
    /// `true` only if `raw` may be stored under `domain`.
    async fn validate(&self, domain: &DomainKey, raw: &[u8]) -> bool;
}
