// crates/cweb-core/src/id.rs
//
// Fixed-width 160-bit identifiers used as store addresses and peer identities.

use std::fmt;

use crate::crypto;
use crate::error::CwebError;

/// Width in bytes of every identifier in the store's address space.
pub const ID_LEN: usize = 20;

/// A 160-bit identifier.
///
/// Used both as a slot address inside a domain and as the network identity
/// of a user, which is derived deterministically from the user's public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CwebId([u8; ID_LEN]);

impl CwebId {
    /// Wrap raw identifier bytes.
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an id from a slice that must be exactly `ID_LEN` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CwebError> {
        let arr: [u8; ID_LEN] = bytes.try_into().map_err(|_| {
            CwebError::Serialization(format!(
                "Identifier must be exactly {} bytes, got {}",
                ID_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Keep the leading `ID_LEN` bytes of `bytes`, zero-padding shorter input.
    pub fn truncate(bytes: &[u8]) -> Self {
        let mut arr = [0u8; ID_LEN];
        let n = bytes.len().min(ID_LEN);
        arr[..n].copy_from_slice(&bytes[..n]);
        Self(arr)
    }

    /// Derive the network identity owned by `public_key`.
    ///
    /// SHA-256 of the raw key bytes, truncated to 160 bits.
    pub fn from_public_key(public_key: &[u8]) -> Self {
        Self::truncate(&crypto::hash_bytes(public_key))
    }

    /// Parse a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CwebError> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    /// The raw 20 identifier bytes.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Lowercase hex, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for CwebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for CwebId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CwebId({})", self.to_hex())
    }
}
