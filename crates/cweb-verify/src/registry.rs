// crates/cweb-verify/src/registry.rs
//
// DomainRegistry: the fixed set of data domains this node admits, each with
// its key, the record type it holds, and how such a record is validated.
//
// Built once at startup and shared read-only. A domain that is not in the
// registry never has data admitted for it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use prost::Message;

use cweb_core::{
    CwebError, DomainKey, SignedUser, SignedVote, ValidationError, USER_DOMAIN, VOTE_DOMAIN,
};

use crate::signature::SignatureValidationService;

/// Parses raw bytes as one domain's record type and validates the result.
#[async_trait]
pub trait DomainValidator: Send + Sync {
    /// `Err(Rejected)` when the bytes do not decode as this domain's record.
    async fn validate_raw(&self, raw: &[u8]) -> Result<bool, ValidationError>;
}

/// Votes: decode as `SignedVote`, check against a registered signer.
pub struct VoteDomain {
    signatures: Arc<SignatureValidationService>,
}

impl VoteDomain {
    pub fn new(signatures: Arc<SignatureValidationService>) -> Self {
        Self { signatures }
    }
}

#[async_trait]
impl DomainValidator for VoteDomain {
    async fn validate_raw(&self, raw: &[u8]) -> Result<bool, ValidationError> {
        let vote = SignedVote::decode(raw)?;
        self.signatures.validate_vote(&vote).await
    }
}

/// Identities: decode as `SignedUser`, check self-signed.
pub struct UserDomain {
    signatures: Arc<SignatureValidationService>,
}

impl UserDomain {
    pub fn new(signatures: Arc<SignatureValidationService>) -> Self {
        Self { signatures }
    }
}

#[async_trait]
impl DomainValidator for UserDomain {
    async fn validate_raw(&self, raw: &[u8]) -> Result<bool, ValidationError> {
        let user = SignedUser::decode(raw)?;
        self.signatures.validate_user(&user)
    }
}

/// One registered domain.
pub struct DomainEntry {
    pub name: String,
    pub key: DomainKey,
    pub validator: Arc<dyn DomainValidator>,
}

impl std::fmt::Debug for DomainEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainEntry")
            .field("name", &self.name)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct DomainRegistry {
    by_key: HashMap<DomainKey, DomainEntry>,
}

impl DomainRegistry {
    /// An empty registry. Nothing is admitted until domains are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry every node runs with: the vote and user domains.
    pub fn standard(signatures: Arc<SignatureValidationService>) -> Result<Self, CwebError> {
        let mut registry = Self::new();
        registry.register(
            VOTE_DOMAIN,
            DomainKey::vote(),
            Arc::new(VoteDomain::new(signatures.clone())),
        )?;
        registry.register(
            USER_DOMAIN,
            DomainKey::user(),
            Arc::new(UserDomain::new(signatures)),
        )?;
        Ok(registry)
    }

    /// Add a domain. Keys and names must both be unique.
    pub fn register(
        &mut self,
        name: &str,
        key: DomainKey,
        validator: Arc<dyn DomainValidator>,
    ) -> Result<(), CwebError> {
        if self.by_key.contains_key(&key) {
            return Err(CwebError::Config(format!(
                "domain key {} registered twice",
                key
            )));
        }
        if self.key_of(name).is_some() {
            return Err(CwebError::Config(format!(
                "domain name '{}' registered twice",
                name
            )));
        }
        self.by_key.insert(
            key,
            DomainEntry {
                name: name.to_string(),
                key,
                validator,
            },
        );
        Ok(())
    }

    /// The entry registered under `key`, if any.
    pub fn get(&self, key: &DomainKey) -> Option<&DomainEntry> {
        self.by_key.get(key)
    }

    /// The key registered for the domain called `name`.
    pub fn key_of(&self, name: &str) -> Option<DomainKey> {
        self.by_key
            .values()
            .find(|entry| entry.name == name)
            .map(|entry| entry.key)
    }

    /// Registered domain names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_key.values().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cweb_core::{KeyLookup, SignedUser};

    struct NobodyLookup;

    #[async_trait]
    impl KeyLookup for NobodyLookup {
        async fn find_owner(&self, _public_key: &[u8]) -> Result<Option<SignedUser>, CwebError> {
            Ok(None)
        }
    }

    fn signatures() -> Arc<SignatureValidationService> {
        Arc::new(SignatureValidationService::new(Arc::new(NobodyLookup)))
    }

    #[test]
    fn standard_has_vote_and_user() {
        let registry = DomainRegistry::standard(signatures()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec![USER_DOMAIN, VOTE_DOMAIN]);
        assert_eq!(registry.key_of(VOTE_DOMAIN), Some(DomainKey::vote()));
        assert_eq!(registry.get(&DomainKey::user()).unwrap().name, USER_DOMAIN);
        assert!(registry.get(&DomainKey::from_name("other")).is_none());
    }

    #[test]
    fn duplicate_key_or_name_is_refused() {
        let svc = signatures();
        let mut registry = DomainRegistry::standard(svc.clone()).unwrap();

        let dup_key = registry.register(
            "votes-again",
            DomainKey::vote(),
            Arc::new(VoteDomain::new(svc.clone())),
        );
        assert!(dup_key.is_err());

        let dup_name = registry.register(
            VOTE_DOMAIN,
            DomainKey::from_name("elsewhere"),
            Arc::new(VoteDomain::new(svc)),
        );
        assert!(dup_name.is_err());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn undecodable_bytes_are_rejected() {
        let domain = VoteDomain::new(signatures());
        let result = domain.validate_raw(&[0xff, 0xff, 0xff]).await;
        assert!(matches!(result, Err(ValidationError::Rejected(_))));
    }
}
