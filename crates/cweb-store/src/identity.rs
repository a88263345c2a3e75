// crates/cweb-store/src/identity.rs
//
// IdentityService: register self-signed identities and resolve them by key.

use std::sync::Arc;

use tracing::info;

use cweb_core::crypto::Keypair;
use cweb_core::{CwebError, DhtStorage, PutOutcome, SignedUser, User};

use crate::multimap::CwebMultiMap;

#[derive(Debug)]
pub struct IdentityService {
    users: CwebMultiMap<Vec<u8>, SignedUser>,
}

impl IdentityService {
    /// Identity operations over the user domain of `storage`.
    pub fn new(storage: Arc<dyn DhtStorage>) -> Self {
        Self {
            users: CwebMultiMap::users(storage),
        }
    }

    /// Build, self-sign, and publish the identity record for `keypair`.
    pub async fn register(
        &self,
        handle: &str,
        keypair: &Keypair,
    ) -> Result<(SignedUser, PutOutcome), CwebError> {
        let user = User::new(handle, keypair.public_key_bytes().to_vec());
        info!("Registering {}", user);
        let record = SignedUser::sign(user, keypair);
        let outcome = self.publish(&record).await?;
        Ok((record, outcome))
    }

    /// Publish an already-signed identity record.
    pub async fn publish(&self, record: &SignedUser) -> Result<PutOutcome, CwebError> {
        let key = record
            .user
            .as_ref()
            .map(|u| u.public_key.clone())
            .ok_or_else(|| CwebError::Serialization("identity record has no user".into()))?;
        self.users.put(&key, record).await
    }

    /// Every identity record registered for exactly this public key.
    pub async fn find_by_public_key(
        &self,
        public_key: &[u8],
    ) -> Result<Vec<SignedUser>, CwebError> {
        let key = public_key.to_vec();
        Ok(self
            .users
            .get(&key)
            .await?
            .into_iter()
            .filter(|r| r.user.as_ref().is_some_and(|u| u.public_key == key))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cweb_core::{DomainKey, IncomingDataValidator};

    use crate::memory::InMemoryDht;

    struct AdmitAll;

    #[async_trait]
    impl IncomingDataValidator for AdmitAll {
        async fn validate(&self, _domain: &DomainKey, _raw: &[u8]) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn register_then_find() {
        let dht = InMemoryDht::new();
        dht.install_validator(Arc::new(AdmitAll)).unwrap();
        let identities = IdentityService::new(Arc::new(dht));
        let keypair = Keypair::generate();

        let (record, outcome) = identities.register("erin", &keypair).await.unwrap();
        assert_eq!(outcome, PutOutcome::Stored);

        let found = identities
            .find_by_public_key(&keypair.public_key_bytes())
            .await
            .unwrap();
        assert_eq!(found, vec![record]);
    }

    #[tokio::test]
    async fn record_without_user_is_refused() {
        let dht = InMemoryDht::new();
        dht.install_validator(Arc::new(AdmitAll)).unwrap();
        let identities = IdentityService::new(Arc::new(dht));
        assert!(identities.publish(&SignedUser::default()).await.is_err());
    }
}
