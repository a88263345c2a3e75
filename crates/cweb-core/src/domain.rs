// crates/cweb-core/src/domain.rs
//
// Domain keys partition the shared store into disjoint logical namespaces.

use std::fmt;

use crate::crypto;
use crate::id::ID_LEN;

/// Name of the domain holding `SignedVote` records.
pub const VOTE_DOMAIN: &str = "vote";
/// Name of the domain holding `SignedUser` records.
pub const USER_DOMAIN: &str = "user";

/// A 160-bit key naming one logical domain of the shared store.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainKey([u8; ID_LEN]);

impl DomainKey {
    /// Wrap raw domain key bytes.
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the key for a domain name: leading 160 bits of
    /// SHA-256("cweb/domain/" || name).
    pub fn from_name(name: &str) -> Self {
        let digest = crypto::hash_bytes(format!("cweb/domain/{}", name).as_bytes());
        let mut arr = [0u8; ID_LEN];
        arr.copy_from_slice(&digest[..ID_LEN]);
        Self(arr)
    }

    pub fn vote() -> Self {
        Self::from_name(VOTE_DOMAIN)
    }

    pub fn user() -> Self {
        Self::from_name(USER_DOMAIN)
    }

    /// The raw 20 key bytes.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Lowercase hex, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainKey({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_domains_are_distinct() {
        assert_ne!(DomainKey::vote(), DomainKey::user());
    }

    #[test]
    fn domain_key_is_stable() {
        assert_eq!(DomainKey::from_name("vote"), DomainKey::vote());
        assert_eq!(DomainKey::vote().to_hex().len(), ID_LEN * 2);
    }
}
