// crates/cweb-core/src/error.rs

use thiserror::Error;

/// Error types shared by every crate in the cweb workspace.
#[derive(Debug, Error)]
pub enum CwebError {
    /// Storage substrate error (RocksDB, in-memory slot table).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cryptographic error (key material, signing).
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Wire encoding/decoding error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Collaborator or transport error (key lookup, remote peers).
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid state (e.g. a validator installed twice).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error (duplicate domain keys, bad config values).
    #[error("Config error: {0}")]
    Config(String),
}

impl From<prost::DecodeError> for CwebError {
    fn from(e: prost::DecodeError) -> Self {
        CwebError::Serialization(e.to_string())
    }
}

impl From<ed25519_dalek::SignatureError> for CwebError {
    fn from(e: ed25519_dalek::SignatureError) -> Self {
        CwebError::Crypto(e.to_string())
    }
}

impl From<hex::FromHexError> for CwebError {
    fn from(e: hex::FromHexError) -> Self {
        CwebError::Serialization(e.to_string())
    }
}

/// Outcome classes of a validation call that did not produce a plain verdict.
///
/// `Rejected` and `CollaboratorFault` never leave the admission path: they are
/// logged and turned into "not admitted". `AlgorithmUnsupported` means the
/// local peer cannot evaluate the signature at all and is surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The input was checked and found unacceptable.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The signature algorithm tag is unknown to this peer.
    #[error("unsupported signature algorithm (tag {0})")]
    AlgorithmUnsupported(i32),

    /// A collaborator (key lookup, storage) failed or timed out.
    #[error("collaborator fault: {0}")]
    CollaboratorFault(String),
}

impl From<prost::DecodeError> for ValidationError {
    fn from(e: prost::DecodeError) -> Self {
        ValidationError::Rejected(format!("malformed record: {}", e))
    }
}

impl From<CwebError> for ValidationError {
    fn from(e: CwebError) -> Self {
        ValidationError::CollaboratorFault(e.to_string())
    }
}
