// crates/cweb-verify/src/lib.rs
//
// cweb-verify: decides which records the node admits into shared storage.
//
// Signature validation at two trust levels (self-signed identities,
// network-verified votes), the registry of admitted domains, and the
// admission validator the storage substrate consults on every write.

pub mod admission;
pub mod registry;
pub mod signature;

// Re-export key types for ergonomic access from downstream crates.
pub use admission::AdmissionValidator;
pub use registry::{DomainEntry, DomainRegistry, DomainValidator, UserDomain, VoteDomain};
pub use signature::{SignatureValidationService, DEFAULT_LOOKUP_TIMEOUT};
