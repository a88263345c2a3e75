// crates/cweb-store/src/lib.rs
//
// cweb-store: storage layer for the cweb reputation network.
//
// Provides the storage substrates (RocksDB-backed and in-memory), per-slot
// locking for atomic check-then-append writes, the key-reduction rules of the
// built-in domains, the typed domain-partitioned multimap, a key lookup that
// reads the user domain, and the vote and identity services built on top.

mod gate;
pub mod identity;
pub mod locks;
pub mod lookup;
pub mod memory;
pub mod multimap;
pub mod reduce;
pub mod rocks;
pub mod votes;

// Re-export key types for ergonomic access from downstream crates.
pub use identity::IdentityService;
pub use locks::SlotLocks;
pub use lookup::DhtKeyLookup;
pub use memory::InMemoryDht;
pub use multimap::{CollisionPredicate, CwebMultiMap, KeyExtractor, KeyReducer};
pub use rocks::RocksDht;
pub use votes::VoteService;
