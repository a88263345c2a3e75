// crates/cweb-core/src/record.rs
//
// Constructors and helpers for the wire records: computing content hashes,
// signing users and votes, and compact renderings for log lines.

use std::fmt;
use std::str::FromStr;

use prost::Message;

use crate::crypto::{self, Keypair};
use crate::error::CwebError;
use crate::id::CwebId;
use crate::proto::{
    Assertion, ContentHash, HashAlgorithm, Rating, Signature, SignatureAlgorithm, SignedUser,
    SignedVote, User, Vote,
};

/// Content property used by the plain up/down vote actions.
pub const DEFAULT_CONTENT_PROPERTY: &str = "appraisal";

impl HashAlgorithm {
    /// Digest width in bytes, or `None` for the unrecognized sentinel.
    pub fn digest_len(self) -> Option<usize> {
        match self {
            HashAlgorithm::Sha1 => Some(20),
            HashAlgorithm::Sha256 => Some(32),
            HashAlgorithm::Unrecognized => None,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = CwebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(|c: char| c == '-' || c == '_', "").as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            other => Err(CwebError::Serialization(format!(
                "Unknown hash algorithm '{}'",
                other
            ))),
        }
    }
}

impl ContentHash {
    /// Build a content hash, checking the digest width against the algorithm.
    pub fn new(algorithm: HashAlgorithm, digest: Vec<u8>) -> Result<Self, CwebError> {
        let expected = algorithm.digest_len().ok_or_else(|| {
            CwebError::Serialization("Cannot build a hash with the unrecognized algorithm".into())
        })?;
        if digest.len() != expected {
            return Err(CwebError::Serialization(format!(
                "{:?} digest must be {} bytes, got {}",
                algorithm,
                expected,
                digest.len()
            )));
        }
        Ok(Self {
            algorithm: algorithm.into(),
            hash_value: digest,
        })
    }

    /// Hash `data` with the given algorithm.
    pub fn compute(algorithm: HashAlgorithm, data: &[u8]) -> Result<Self, CwebError> {
        let digest = match algorithm {
            HashAlgorithm::Sha1 => crypto::sha1_bytes(data).to_vec(),
            HashAlgorithm::Sha256 => crypto::hash_bytes(data).to_vec(),
            HashAlgorithm::Unrecognized => {
                return Err(CwebError::Serialization(
                    "Cannot compute a hash with the unrecognized algorithm".into(),
                ))
            }
        };
        Self::new(algorithm, digest)
    }

    /// Parse a hex digest for the given algorithm.
    pub fn from_hex(algorithm: HashAlgorithm, digest_hex: &str) -> Result<Self, CwebError> {
        Self::new(algorithm, hex::decode(digest_hex.trim())?)
    }

    /// The algorithm tag, if it is one this peer knows.
    pub fn known_algorithm(&self) -> Option<HashAlgorithm> {
        match HashAlgorithm::try_from(self.algorithm) {
            Ok(HashAlgorithm::Unrecognized) | Err(_) => None,
            Ok(alg) => Some(alg),
        }
    }

    /// True when the algorithm is known and the digest has its exact width.
    pub fn is_well_formed(&self) -> bool {
        self.known_algorithm()
            .and_then(HashAlgorithm::digest_len)
            .is_some_and(|len| len == self.hash_value.len())
    }

    /// The digest as lowercase hex, without the algorithm tag.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.hash_value)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.known_algorithm() {
            Some(alg) => write!(f, "{:?}:{}", alg, self.to_hex()),
            None => write!(f, "tag{}:{}", self.algorithm, self.to_hex()),
        }
    }
}

impl Signature {
    /// Sign `data` with ed25519, embedding the signer's public key.
    pub fn ed25519(keypair: &Keypair, data: &[u8]) -> Self {
        Self {
            algorithm: SignatureAlgorithm::Ed25519.into(),
            public_key: keypair.public_key_bytes().to_vec(),
            signature: keypair.sign(data),
        }
    }

    /// The network identity of whoever holds the embedded key.
    pub fn signer_id(&self) -> CwebId {
        CwebId::from_public_key(&self.public_key)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature(alg={}, key={}, {} bytes)",
            self.algorithm,
            hex::encode(&self.public_key),
            self.signature.len()
        )
    }
}

impl User {
    /// An unsigned identity binding `handle` to `public_key`.
    pub fn new(handle: impl Into<String>, public_key: Vec<u8>) -> Self {
        Self {
            handle: handle.into(),
            public_key,
        }
    }

    /// The network identity derived from this user's public key.
    pub fn id(&self) -> CwebId {
        CwebId::from_public_key(&self.public_key)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User({} @ {})", self.handle, self.id())
    }
}

impl SignedUser {
    /// Self-sign a user record with the keypair whose public key it embeds.
    pub fn sign(user: User, keypair: &Keypair) -> Self {
        let signature = Signature::ed25519(keypair, &user.encode_to_vec());
        Self {
            user: Some(user),
            signature: Some(signature),
        }
    }
}

impl Assertion {
    /// A rating of one named property of the content.
    pub fn new(content_property: impl Into<String>, rating: Rating) -> Self {
        Self {
            content_property: content_property.into(),
            rating: rating.into(),
        }
    }
}

impl Vote {
    /// An unsigned vote making `assertions` about `content_hash`.
    pub fn new(content_hash: ContentHash, assertions: Vec<Assertion>) -> Self {
        Self {
            content_hash: Some(content_hash),
            assertions,
        }
    }

    /// A vote with a single assertion on the default content property.
    pub fn appraisal(content_hash: ContentHash, rating: Rating) -> Self {
        Self::new(
            content_hash,
            vec![Assertion::new(DEFAULT_CONTENT_PROPERTY, rating)],
        )
    }
}

impl SignedVote {
    pub fn sign(vote: Vote, keypair: &Keypair) -> Self {
        let signature = Signature::ed25519(keypair, &vote.encode_to_vec());
        Self {
            vote: Some(vote),
            signature: Some(signature),
        }
    }

    /// The content hash voted on, if present.
    pub fn content_hash(&self) -> Option<&ContentHash> {
        self.vote.as_ref().and_then(|v| v.content_hash.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_checks_width() {
        assert!(ContentHash::new(HashAlgorithm::Sha1, vec![0u8; 20]).is_ok());
        assert!(ContentHash::new(HashAlgorithm::Sha1, vec![0u8; 32]).is_err());
        assert!(ContentHash::new(HashAlgorithm::Sha256, vec![0u8; 32]).is_ok());
        assert!(ContentHash::new(HashAlgorithm::Unrecognized, vec![]).is_err());
    }

    #[test]
    fn unknown_algorithm_tag_is_not_well_formed() {
        let hash = ContentHash {
            algorithm: 42,
            hash_value: vec![0u8; 20],
        };
        assert!(hash.known_algorithm().is_none());
        assert!(!hash.is_well_formed());
    }

    #[test]
    fn compute_and_parse_hex() {
        let hash = ContentHash::compute(HashAlgorithm::Sha1, b"torrent").unwrap();
        assert!(hash.is_well_formed());
        let parsed = ContentHash::from_hex(HashAlgorithm::Sha1, &hash.to_hex()).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn algorithm_names_parse() {
        assert_eq!("SHA-1".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha1);
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn signed_user_embeds_signer_key() {
        let keypair = Keypair::generate();
        let user = User::new("alice", keypair.public_key_bytes().to_vec());
        let signed = SignedUser::sign(user.clone(), &keypair);

        let signature = signed.signature.as_ref().unwrap();
        assert_eq!(signature.public_key, user.public_key);
        assert_eq!(signature.signer_id(), user.id());
        assert!(crypto::verify_signature(
            &signature.public_key,
            &user.encode_to_vec(),
            &signature.signature
        )
        .unwrap());
    }

    #[test]
    fn signed_vote_survives_wire_encoding() {
        let keypair = Keypair::generate();
        let hash = ContentHash::compute(HashAlgorithm::Sha256, b"object").unwrap();
        let signed = SignedVote::sign(Vote::appraisal(hash.clone(), Rating::Good), &keypair);

        let decoded = SignedVote::decode(signed.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.content_hash(), Some(&hash));
        assert_eq!(decoded.vote.unwrap().assertions[0].rating(), Rating::Good);
    }
}
