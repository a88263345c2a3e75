// crates/cweb-store/src/lookup.rs
//
// DhtKeyLookup: resolves a public key to its registered identity by reading
// the user domain of the shared store.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use tracing::debug;

use cweb_core::{CwebError, DhtStorage, KeyLookup, SignedUser};

use crate::multimap::CwebMultiMap;

/// Key lookup backed by the user domain.
///
/// Holds the substrate weakly: the substrate's admission validator usually
/// owns this lookup, and a strong handle would keep both alive forever.
#[derive(Debug, Clone)]
pub struct DhtKeyLookup {
    storage: Weak<dyn DhtStorage>,
}

impl DhtKeyLookup {
    pub fn new(storage: &Arc<dyn DhtStorage>) -> Self {
        Self {
            storage: Arc::downgrade(storage),
        }
    }
}

#[async_trait]
impl KeyLookup for DhtKeyLookup {
    async fn find_owner(&self, public_key: &[u8]) -> Result<Option<SignedUser>, CwebError> {
        let storage = self
            .storage
            .upgrade()
            .ok_or_else(|| CwebError::InvalidState("storage substrate has been dropped".into()))?;

        let key = public_key.to_vec();
        let users = CwebMultiMap::users(storage);
        let owner = users.get(&key).await?.into_iter().find(|record| {
            record
                .user
                .as_ref()
                .is_some_and(|u| u.public_key == public_key)
        });

        debug!(
            "Key lookup for {}: {}",
            hex::encode(public_key),
            if owner.is_some() { "found" } else { "not found" }
        );
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cweb_core::crypto::Keypair;
    use cweb_core::{DomainKey, IncomingDataValidator, User};

    use crate::memory::InMemoryDht;

    struct AdmitAll;

    #[async_trait]
    impl IncomingDataValidator for AdmitAll {
        async fn validate(&self, _domain: &DomainKey, _raw: &[u8]) -> bool {
            true
        }
    }

    fn storage() -> Arc<dyn DhtStorage> {
        let dht = InMemoryDht::new();
        dht.install_validator(Arc::new(AdmitAll)).unwrap();
        Arc::new(dht)
    }

    #[tokio::test]
    async fn finds_registered_owner() {
        let storage = storage();
        let keypair = Keypair::generate();
        let key = keypair.public_key_bytes().to_vec();
        let record = SignedUser::sign(User::new("dave", key.clone()), &keypair);
        CwebMultiMap::users(storage.clone()).put(&key, &record).await.unwrap();

        let lookup = DhtKeyLookup::new(&storage);
        assert_eq!(lookup.find_owner(&key).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn unknown_key_is_none() {
        let storage = storage();
        let lookup = DhtKeyLookup::new(&storage);
        let key = Keypair::generate().public_key_bytes();
        assert_eq!(lookup.find_owner(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn dropped_storage_is_an_error() {
        let storage = storage();
        let lookup = DhtKeyLookup::new(&storage);
        drop(storage);
        assert!(lookup.find_owner(&[0u8; 32]).await.is_err());
    }
}
