// crates/cweb-store/src/rocks.rs
//
// RocksDB-backed persistent storage substrate.
//
// Key format:
//   - `slot:{domain_hex}:{slot_hex}:{value_sha256_hex}` -> raw value bytes
//
// All values of one address share the `slot:{domain_hex}:{slot_hex}:` prefix,
// so a read is a single prefix scan. Keying on the value digest gives set
// semantics: re-putting an identical value is a no-op.

use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options};
use tracing::debug;

use cweb_core::crypto;
use cweb_core::{
    ConflictFn, CwebError, CwebId, DhtStorage, DomainKey, IncomingDataValidator, PutOutcome,
};

use crate::gate::AdmissionGate;
use crate::locks::SlotLocks;

/// RocksDB wrapper implementing the `DhtStorage` trait.
#[derive(Debug)]
pub struct RocksDht {
    db: DBWithThreadMode<MultiThreaded>,
    locks: SlotLocks,
    gate: AdmissionGate,
}

impl RocksDht {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, CwebError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path)
            .map_err(|e| CwebError::Storage(format!("Failed to open RocksDB at {}: {}", path, e)))?;

        Ok(Self {
            db,
            locks: SlotLocks::new(),
            gate: AdmissionGate::default(),
        })
    }

    /// Install the admission validator. May be called once.
    pub fn install_validator(
        &self,
        validator: Arc<dyn IncomingDataValidator>,
    ) -> Result<(), CwebError> {
        self.gate.install(validator)
    }

    /// Prefix shared by every value of one address.
    fn slot_prefix(domain: &DomainKey, slot: &CwebId) -> Vec<u8> {
        format!("slot:{}:{}:", domain.to_hex(), slot.to_hex()).into_bytes()
    }

    /// Full key of one value: prefix plus the value's SHA-256.
    fn value_key(domain: &DomainKey, slot: &CwebId, value: &[u8]) -> Vec<u8> {
        let mut key = Self::slot_prefix(domain, slot);
        key.extend_from_slice(hex::encode(crypto::hash_bytes(value)).as_bytes());
        key
    }

    /// Put raw bytes into RocksDB, mapping errors to CwebError::Storage.
    fn put_raw(&self, key: &[u8], value: &[u8]) -> Result<(), CwebError> {
        self.db
            .put(key, value)
            .map_err(|e| CwebError::Storage(format!("RocksDB put failed: {}", e)))
    }

    /// Check key presence, mapping errors to CwebError::Storage.
    fn contains_raw(&self, key: &[u8]) -> Result<bool, CwebError> {
        self.db
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| CwebError::Storage(format!("RocksDB get failed: {}", e)))
    }

    /// Scan every value stored under the address.
    fn scan_slot(&self, domain: &DomainKey, slot: &CwebId) -> Result<Vec<Vec<u8>>, CwebError> {
        let prefix = Self::slot_prefix(domain, slot);
        let mut values = Vec::new();

        for item in self.db.prefix_iterator(&prefix) {
            let (key, value) = item
                .map_err(|e| CwebError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(&prefix) {
                break;
            }
            values.push(value.to_vec());
        }

        Ok(values)
    }
}

#[async_trait]
impl DhtStorage for RocksDht {
    async fn put_unless(
        &self,
        domain: &DomainKey,
        slot: &CwebId,
        value: Vec<u8>,
        conflicts: ConflictFn<'_>,
    ) -> Result<PutOutcome, CwebError> {
        let _guard = self.locks.lock(domain, slot).await;

        let key = Self::value_key(domain, slot, &value);
        if self.contains_raw(&key)? {
            return Ok(PutOutcome::AlreadyPresent);
        }
        if self.scan_slot(domain, slot)?.iter().any(|v| conflicts(v)) {
            debug!("Collision at {}/{}: write refused", domain, slot);
            return Ok(PutOutcome::Collision);
        }
        if !self.gate.admit(domain, &value).await {
            debug!("Admission refused write at {}/{}", domain, slot);
            return Ok(PutOutcome::Rejected);
        }

        self.put_raw(&key, &value)?;
        Ok(PutOutcome::Stored)
    }

    async fn get(&self, domain: &DomainKey, slot: &CwebId) -> Result<Vec<Vec<u8>>, CwebError> {
        self.scan_slot(domain, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AdmitAll;

    #[async_trait]
    impl IncomingDataValidator for AdmitAll {
        async fn validate(&self, _domain: &DomainKey, _raw: &[u8]) -> bool {
            true
        }
    }

    fn temp_db_path(label: &str) -> String {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("cweb_test_{}_{}", label, uuid::Uuid::now_v7()));
        path.to_string_lossy().to_string()
    }

    #[test]
    fn value_keys_share_the_slot_prefix() {
        let domain = DomainKey::vote();
        let slot = CwebId::truncate(b"slot");
        let prefix = RocksDht::slot_prefix(&domain, &slot);
        let key = RocksDht::value_key(&domain, &slot, b"value");
        assert!(key.starts_with(&prefix));
        assert_eq!(key.len(), prefix.len() + 64);
    }

    #[tokio::test]
    async fn put_get_and_reopen() {
        let path = temp_db_path("rocks_reopen");
        let domain = DomainKey::vote();
        let slot = CwebId::truncate(b"slot");
        let neighbour = CwebId::truncate(b"slou");

        {
            let dht = RocksDht::open(&path).unwrap();
            dht.install_validator(Arc::new(AdmitAll)).unwrap();
            assert_eq!(dht.put(&domain, &slot, b"a".to_vec()).await.unwrap(), PutOutcome::Stored);
            assert_eq!(dht.put(&domain, &slot, b"b".to_vec()).await.unwrap(), PutOutcome::Stored);
            assert_eq!(
                dht.put(&domain, &slot, b"a".to_vec()).await.unwrap(),
                PutOutcome::AlreadyPresent
            );
            dht.put(&domain, &neighbour, b"c".to_vec()).await.unwrap();
        }

        let dht = RocksDht::open(&path).unwrap();
        let mut values = dht.get(&domain, &slot).await.unwrap();
        values.sort();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec()]);
        assert!(dht.get(&DomainKey::user(), &slot).await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn refuses_without_validator() {
        let path = temp_db_path("rocks_gate");
        let dht = RocksDht::open(&path).unwrap();
        let outcome = dht
            .put(&DomainKey::user(), &CwebId::truncate(b"x"), b"v".to_vec())
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::Rejected);
        let _ = std::fs::remove_dir_all(&path);
    }
}
