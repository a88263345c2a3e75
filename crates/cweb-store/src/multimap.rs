// crates/cweb-store/src/multimap.rs
//
// CwebMultiMap: typed, domain-partitioned multimap over a storage substrate.
//
// A logical key (e.g. a content hash) is reduced to a slot inside one domain.
// A slot holds any number of values. Because reduction narrows the keyspace,
// two unrelated keys can share a slot; the collision predicate decides, for
// each value already at the slot, whether the incoming key may live next to
// it. One refusal rejects the write. The check and the append run under the
// substrate's slot lock.
//
// Only values that actually belong at the slot can refuse a write. The
// substrate accepts raw writes at any address, so a value whose own key
// reduces elsewhere is skipped, the same as an undecodable one.

use std::fmt;
use std::sync::Arc;

use prost::Message;
use tracing::debug;

use cweb_core::{
    ContentHash, CwebError, CwebId, DhtStorage, DomainKey, PutOutcome, SignedUser, SignedVote,
};

use crate::reduce;

/// Reduces a logical key to a slot.
pub type KeyReducer<K> = Arc<dyn Fn(&K) -> CwebId + Send + Sync>;

/// `true` when a value for the key may coexist with an existing value.
pub type CollisionPredicate<K, V> = Arc<dyn Fn(&K, &V) -> bool + Send + Sync>;

/// The logical key a stored value was written under, if it names one.
pub type KeyExtractor<K, V> = Arc<dyn Fn(&V) -> Option<K> + Send + Sync>;

pub struct CwebMultiMap<K, V> {
    storage: Arc<dyn DhtStorage>,
    domain: DomainKey,
    reduce: KeyReducer<K>,
    key_of: KeyExtractor<K, V>,
    not_collision: CollisionPredicate<K, V>,
}

impl<K, V> CwebMultiMap<K, V>
where
    K: Sync,
    V: Message + Default,
{
    pub fn new(
        storage: Arc<dyn DhtStorage>,
        domain: DomainKey,
        reduce: impl Fn(&K) -> CwebId + Send + Sync + 'static,
        key_of: impl Fn(&V) -> Option<K> + Send + Sync + 'static,
        not_collision: impl Fn(&K, &V) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            storage,
            domain,
            reduce: Arc::new(reduce),
            key_of: Arc::new(key_of),
            not_collision: Arc::new(not_collision),
        }
    }

    /// Whether `value` was written under a key that reduces to `slot`.
    pub fn belongs_at(&self, slot: &CwebId, value: &V) -> bool {
        (self.key_of)(value).is_some_and(|key| self.slot_for(&key) == *slot)
    }

    pub fn domain(&self) -> &DomainKey {
        &self.domain
    }

    /// The slot `key` reduces to.
    pub fn slot_for(&self, key: &K) -> CwebId {
        (self.reduce)(key)
    }

    /// Store `value` under `key` unless it collides with a value already at
    /// the slot or is refused by admission.
    pub async fn put(&self, key: &K, value: &V) -> Result<PutOutcome, CwebError> {
        let slot = self.slot_for(key);
        let not_collision = &self.not_collision;
        let conflicts = |raw: &[u8]| match V::decode(raw) {
            Ok(existing) if !self.belongs_at(&slot, &existing) => {
                debug!("Ignoring misplaced value at slot {}", slot);
                false
            }
            Ok(existing) => !not_collision(key, &existing),
            Err(e) => {
                debug!("Skipping undecodable value at slot {}: {}", slot, e);
                false
            }
        };

        let outcome = self
            .storage
            .put_unless(&self.domain, &slot, value.encode_to_vec(), &conflicts)
            .await?;
        debug!("put {}/{} -> {:?}", self.domain, slot, outcome);
        Ok(outcome)
    }

    /// Every value co-located at the slot `key` reduces to.
    ///
    /// No filtering by the full key happens here; callers that need it must
    /// compare keys themselves.
    pub async fn get(&self, key: &K) -> Result<Vec<V>, CwebError> {
        let slot = self.slot_for(key);
        let raw_values = self.storage.get(&self.domain, &slot).await?;

        let mut values = Vec::with_capacity(raw_values.len());
        for raw in raw_values {
            match V::decode(raw.as_slice()) {
                Ok(v) => values.push(v),
                Err(e) => debug!("Skipping undecodable value at slot {}: {}", slot, e),
            }
        }
        Ok(values)
    }
}

impl CwebMultiMap<ContentHash, SignedVote> {
    /// The vote domain: slots by truncated content hash, co-location only for
    /// votes on the same content hash.
    pub fn votes(storage: Arc<dyn DhtStorage>) -> Self {
        Self::new(
            storage,
            DomainKey::vote(),
            reduce::reduce_content_hash,
            reduce::vote_key,
            reduce::vote_not_collision,
        )
    }
}

impl CwebMultiMap<Vec<u8>, SignedUser> {
    /// The user domain: slots by the identity a public key derives.
    pub fn users(storage: Arc<dyn DhtStorage>) -> Self {
        Self::new(
            storage,
            DomainKey::user(),
            reduce::reduce_public_key,
            reduce::user_key,
            reduce::user_not_collision,
        )
    }
}

impl<K, V> fmt::Debug for CwebMultiMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CwebMultiMap")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cweb_core::crypto::Keypair;
    use cweb_core::{HashAlgorithm, IncomingDataValidator, Rating, User, Vote};

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

    fn vote_on(hash: &ContentHash, rating: Rating) -> SignedVote {
        SignedVote::sign(Vote::appraisal(hash.clone(), rating), &Keypair::generate())
    }

    /// Two distinct hashes that share a slot under truncation.
    fn colliding_pair() -> (ContentHash, ContentHash) {
        let a = ContentHash::compute(HashAlgorithm::Sha256, b"first").unwrap();
        let mut digest = a.hash_value.clone();
        digest[31] ^= 0xff;
        let b = ContentHash::new(HashAlgorithm::Sha256, digest).unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let votes = CwebMultiMap::votes(storage());
        let hash = ContentHash::compute(HashAlgorithm::Sha1, b"file").unwrap();
        let vote = vote_on(&hash, Rating::Good);

        assert_eq!(votes.put(&hash, &vote).await.unwrap(), PutOutcome::Stored);
        assert_eq!(votes.get(&hash).await.unwrap(), vec![vote]);
    }

    #[tokio::test]
    async fn many_votes_on_one_hash_share_a_slot() {
        let votes = CwebMultiMap::votes(storage());
        let hash = ContentHash::compute(HashAlgorithm::Sha1, b"popular").unwrap();

        for rating in [Rating::Good, Rating::Bad, Rating::Good] {
            let outcome = votes.put(&hash, &vote_on(&hash, rating)).await.unwrap();
            assert_eq!(outcome, PutOutcome::Stored);
        }
        assert_eq!(votes.get(&hash).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn permissive_predicate_keeps_both_colliding_values() {
        let (a, b) = colliding_pair();
        let map: CwebMultiMap<ContentHash, SignedVote> = CwebMultiMap::new(
            storage(),
            DomainKey::vote(),
            reduce::reduce_content_hash,
            reduce::vote_key,
            |_, _| true,
        );
        assert_eq!(map.slot_for(&a), map.slot_for(&b));

        let va = vote_on(&a, Rating::Good);
        let vb = vote_on(&b, Rating::Bad);
        assert_eq!(map.put(&a, &va).await.unwrap(), PutOutcome::Stored);
        assert_eq!(map.put(&b, &vb).await.unwrap(), PutOutcome::Stored);

        assert_eq!(map.get(&a).await.unwrap().len(), 2);
        assert_eq!(map.get(&b).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn strict_predicate_rejects_second_colliding_value() {
        let (a, b) = colliding_pair();
        let votes = CwebMultiMap::votes(storage());
        assert_eq!(votes.slot_for(&a), votes.slot_for(&b));

        let va = vote_on(&a, Rating::Good);
        let vb = vote_on(&b, Rating::Good);
        assert_eq!(votes.put(&a, &va).await.unwrap(), PutOutcome::Stored);
        assert_eq!(votes.put(&b, &vb).await.unwrap(), PutOutcome::Collision);

        assert_eq!(votes.get(&b).await.unwrap(), vec![va]);
    }

    #[tokio::test]
    async fn misplaced_value_does_not_block_the_slot() {
        let storage = storage();
        let votes = CwebMultiMap::votes(storage.clone());
        let target = ContentHash::compute(HashAlgorithm::Sha1, b"target").unwrap();
        let unrelated = ContentHash::compute(HashAlgorithm::Sha1, b"unrelated").unwrap();

        // Written straight into the target's slot, bypassing the reducer.
        let planted = vote_on(&unrelated, Rating::Bad);
        let outcome = storage
            .put(&DomainKey::vote(), &votes.slot_for(&target), planted.encode_to_vec())
            .await
            .unwrap();
        assert_eq!(outcome, PutOutcome::Stored);
        assert!(!votes.belongs_at(&votes.slot_for(&target), &planted));

        let legit = vote_on(&target, Rating::Good);
        assert_eq!(votes.put(&target, &legit).await.unwrap(), PutOutcome::Stored);
        assert_eq!(votes.get(&target).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn users_slot_by_identity() {
        let users = CwebMultiMap::users(storage());
        let keypair = Keypair::generate();
        let key = keypair.public_key_bytes().to_vec();
        let record = SignedUser::sign(User::new("carol", key.clone()), &keypair);

        assert_eq!(users.slot_for(&key), CwebId::from_public_key(&key));
        users.put(&key, &record).await.unwrap();
        assert_eq!(users.get(&key).await.unwrap(), vec![record]);
    }

    #[tokio::test]
    async fn get_on_empty_slot_is_empty() {
        let votes = CwebMultiMap::votes(storage());
        let hash = ContentHash::compute(HashAlgorithm::Sha1, b"nobody").unwrap();
        assert!(votes.get(&hash).await.unwrap().is_empty());
    }
}
