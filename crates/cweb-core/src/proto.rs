// crates/cweb-core/src/proto.rs
//
// Protobuf wire schema for every record stored in the shared key-value store.
//
// Field tags are the compatibility contract: new fields get new tags, old tags
// are never reused. Algorithm tags are explicit so that a record is
// self-describing; a tag this peer does not know decodes as a raw integer and
// is rejected at validation time rather than guessed.

use prost::{Enumeration, Message};

/// Digest algorithm of a `ContentHash`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum HashAlgorithm {
    Unrecognized = 0,
    Sha1 = 1,
    Sha256 = 2,
}

/// Signature scheme of a `Signature`.
///
/// `Unrecognized` is what a peer sees when the publisher runs a newer protocol
/// version; it is never a valid algorithm to verify with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum SignatureAlgorithm {
    Unrecognized = 0,
    Ed25519 = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Enumeration)]
#[repr(i32)]
pub enum Rating {
    Unspecified = 0,
    Good = 1,
    Bad = 2,
}

/// Identifier of a piece of content: an algorithm tag plus its digest.
#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct ContentHash {
    #[prost(enumeration = "HashAlgorithm", tag = "1")]
    pub algorithm: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub hash_value: Vec<u8>,
}

#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct Signature {
    #[prost(enumeration = "SignatureAlgorithm", tag = "1")]
    pub algorithm: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub public_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub signature: Vec<u8>,
}

/// Unsigned identity record.
#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub handle: String,
    #[prost(bytes = "vec", tag = "2")]
    pub public_key: Vec<u8>,
}

/// Identity credential signed by the key it embeds.
#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct SignedUser {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
    #[prost(message, optional, tag = "2")]
    pub signature: Option<Signature>,
}

#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct Assertion {
    #[prost(string, tag = "1")]
    pub content_property: String,
    #[prost(enumeration = "Rating", tag = "2")]
    pub rating: i32,
}

#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct Vote {
    #[prost(message, optional, tag = "1")]
    pub content_hash: Option<ContentHash>,
    #[prost(message, repeated, tag = "2")]
    pub assertions: Vec<Assertion>,
}

/// A vote signed by its author.
#[derive(Clone, PartialEq, Eq, Hash, Message)]
pub struct SignedVote {
    #[prost(message, optional, tag = "1")]
    pub vote: Option<Vote>,
    #[prost(message, optional, tag = "2")]
    pub signature: Option<Signature>,
}
