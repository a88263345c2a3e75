// crates/cweb-store/src/reduce.rs
//
// Key reduction and collision predicates for the built-in domains.
//
// Content hashes are reduced to a slot by truncation: the leading 160 bits of
// the digest. A SHA-1 digest is its own slot; a SHA-256 digest keeps its first
// 20 bytes. The algorithm tag is not part of the slot, so a SHA-1 hash and a
// SHA-256 hash sharing 160 leading bits land on the same slot. The collision
// predicates tell such a case apart from deliberate co-location by comparing
// the full key.
//
// Identities are slotted by `CwebId::from_public_key`, the same derivation
// used for a user's network identity.
//
// Every stored value also names its own key. A value whose key does not
// reduce to the slot it sits in was placed there directly through the
// substrate, and is ignored when deciding collisions.

use cweb_core::{ContentHash, CwebId, SignedUser, SignedVote};

/// Slot of a content hash: the leading 160 bits of its digest.
pub fn reduce_content_hash(hash: &ContentHash) -> CwebId {
    CwebId::truncate(&hash.hash_value)
}

/// Slot of a public key: the identity it derives.
pub fn reduce_public_key(public_key: &Vec<u8>) -> CwebId {
    CwebId::from_public_key(public_key)
}

/// The content hash a vote is about.
pub fn vote_key(vote: &SignedVote) -> Option<ContentHash> {
    vote.content_hash().cloned()
}

/// The public key a user record registers.
pub fn user_key(record: &SignedUser) -> Option<Vec<u8>> {
    record.user.as_ref().map(|u| u.public_key.clone())
}

/// A vote may share a slot only with votes about the same content hash.
pub fn vote_not_collision(hash: &ContentHash, existing: &SignedVote) -> bool {
    existing.content_hash() == Some(hash)
}

/// A user record may share a slot only with records for the same public key.
pub fn user_not_collision(public_key: &Vec<u8>, existing: &SignedUser) -> bool {
    existing
        .user
        .as_ref()
        .is_some_and(|u| &u.public_key == public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cweb_core::crypto::Keypair;
    use cweb_core::{HashAlgorithm, Rating, User, Vote};

    #[test]
    fn sha1_digest_is_its_own_slot() {
        let hash = ContentHash::compute(HashAlgorithm::Sha1, b"payload").unwrap();
        assert_eq!(reduce_content_hash(&hash).as_bytes()[..], hash.hash_value[..]);
    }

    #[test]
    fn sha256_keeps_leading_bits() {
        let hash = ContentHash::compute(HashAlgorithm::Sha256, b"payload").unwrap();
        assert_eq!(reduce_content_hash(&hash).as_bytes()[..], hash.hash_value[..20]);
    }

    #[test]
    fn reduction_is_deterministic() {
        let hash = ContentHash::compute(HashAlgorithm::Sha256, b"same").unwrap();
        assert_eq!(reduce_content_hash(&hash), reduce_content_hash(&hash.clone()));
        let key = vec![7u8; 32];
        assert_eq!(reduce_public_key(&key), CwebId::from_public_key(&key));
    }

    #[test]
    fn cross_algorithm_prefix_collides_on_slot_but_not_on_predicate() {
        let wide = ContentHash::compute(HashAlgorithm::Sha256, b"wide").unwrap();
        let narrow = ContentHash::new(HashAlgorithm::Sha1, wide.hash_value[..20].to_vec()).unwrap();
        assert_eq!(reduce_content_hash(&wide), reduce_content_hash(&narrow));

        let keypair = Keypair::generate();
        let existing = SignedVote::sign(Vote::appraisal(wide.clone(), Rating::Good), &keypair);
        assert!(vote_not_collision(&wide, &existing));
        assert!(!vote_not_collision(&narrow, &existing));
    }

    #[test]
    fn values_name_their_own_keys() {
        let keypair = Keypair::generate();
        let hash = ContentHash::compute(HashAlgorithm::Sha1, b"keyed").unwrap();
        let vote = SignedVote::sign(Vote::appraisal(hash.clone(), Rating::Bad), &keypair);
        assert_eq!(vote_key(&vote), Some(hash));
        assert_eq!(vote_key(&SignedVote::default()), None);

        let key = keypair.public_key_bytes().to_vec();
        let record = SignedUser::sign(User::new("ann", key.clone()), &keypair);
        assert_eq!(user_key(&record), Some(key));
        assert_eq!(user_key(&SignedUser::default()), None);
    }

    #[test]
    fn user_predicate_compares_full_key() {
        let keypair = Keypair::generate();
        let key = keypair.public_key_bytes().to_vec();
        let existing = SignedUser::sign(User::new("bob", key.clone()), &keypair);

        assert!(user_not_collision(&key, &existing));
        assert!(!user_not_collision(&vec![0u8; 32], &existing));
        assert!(!user_not_collision(&key, &SignedUser::default()));
    }
}
