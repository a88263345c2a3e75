// crates/cweb-core/src/lib.rs
//
// cweb-core: wire types, identifiers, traits, and crypto primitives for the
// cweb reputation network.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines the signed records peers exchange, the fixed-width identifiers
// that address the shared store, and the collaborator traits (storage
// substrate, key lookup, admission) the other crates implement.

pub mod crypto;
pub mod domain;
pub mod error;
pub mod id;
pub mod proto;
pub mod record;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use cweb_core::SignedVote;`

pub use domain::{DomainKey, USER_DOMAIN, VOTE_DOMAIN};
pub use error::{CwebError, ValidationError};
pub use id::{CwebId, ID_LEN};
pub use proto::{
    Assertion, ContentHash, HashAlgorithm, Rating, Signature, SignatureAlgorithm, SignedUser,
    SignedVote, User, Vote,
};
pub use record::DEFAULT_CONTENT_PROPERTY;
pub use traits::{ConflictFn, DhtStorage, IncomingDataValidator, KeyLookup, PutOutcome};
