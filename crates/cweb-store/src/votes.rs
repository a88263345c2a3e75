// crates/cweb-store/src/votes.rs
//
// VoteService: cast signed votes on content and read them back.

use std::sync::Arc;

use tracing::info;

use cweb_core::crypto::Keypair;
use cweb_core::{ContentHash, CwebError, DhtStorage, PutOutcome, Rating, SignedVote, Vote};

use crate::multimap::CwebMultiMap;

/// Publishes votes into the vote domain on behalf of one local identity.
#[derive(Debug)]
pub struct VoteService {
    votes: CwebMultiMap<ContentHash, SignedVote>,
    keypair: Option<Arc<Keypair>>,
}

impl VoteService {
    /// A service that signs new votes with `keypair`.
    pub fn new(storage: Arc<dyn DhtStorage>, keypair: Arc<Keypair>) -> Self {
        Self {
            votes: CwebMultiMap::votes(storage),
            keypair: Some(keypair),
        }
    }

    /// A service that can list votes but not sign new ones.
    pub fn read_only(storage: Arc<dyn DhtStorage>) -> Self {
        Self {
            votes: CwebMultiMap::votes(storage),
            keypair: None,
        }
    }

    /// Publish an already-signed vote.
    pub async fn cast_vote(&self, signed: &SignedVote) -> Result<PutOutcome, CwebError> {
        let hash = signed
            .content_hash()
            .ok_or_else(|| CwebError::Serialization("vote has no content hash".into()))?;
        if !hash.is_well_formed() {
            return Err(CwebError::Serialization(format!(
                "malformed content hash {}",
                hash
            )));
        }

        let outcome = self.votes.put(hash, signed).await?;
        info!("Vote on {} -> {:?}", hash, outcome);
        Ok(outcome)
    }

    /// Sign `vote` with the local keypair and publish it.
    pub async fn vote(&self, vote: Vote) -> Result<PutOutcome, CwebError> {
        let keypair = self
            .keypair
            .as_ref()
            .ok_or_else(|| CwebError::InvalidState("no signing key loaded".into()))?;
        let signed = SignedVote::sign(vote, keypair);
        self.cast_vote(&signed).await
    }

    pub async fn up_vote(&self, hash: ContentHash) -> Result<PutOutcome, CwebError> {
        self.vote(Vote::appraisal(hash, Rating::Good)).await
    }

    pub async fn down_vote(&self, hash: ContentHash) -> Result<PutOutcome, CwebError> {
        self.vote(Vote::appraisal(hash, Rating::Bad)).await
    }

    /// All votes about exactly `hash`.
    ///
    /// The slot may also hold votes for other hashes that reduce to it; those
    /// are filtered out here.
    pub async fn get_all_votes(&self, hash: &ContentHash) -> Result<Vec<SignedVote>, CwebError> {
        Ok(self
            .votes
            .get(hash)
            .await?
            .into_iter()
            .filter(|v| v.content_hash() == Some(hash))
            .collect())
    }
}
