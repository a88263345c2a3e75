// crates/cweb-cli/src/commands/votes.rs
//
// `cweb vote` and `cweb votes`: appraise content and list appraisals.

use std::sync::Arc;

use clap::Args;

use cweb_core::{
    Assertion, ContentHash, HashAlgorithm, PutOutcome, Rating, Vote, DEFAULT_CONTENT_PROPERTY,
};

use crate::commands::keys::load_keypair;
use crate::config::CwebConfig;
use crate::node::Node;

/// Arguments of `cweb vote`.
#[derive(Debug, Args)]
pub struct VoteCmd {
    /// Hex digest of the content being appraised.
    pub hash: String,

    /// Rate the content good.
    #[arg(long, conflicts_with = "down", required_unless_present = "down")]
    pub up: bool,

    /// Rate the content bad.
    #[arg(long)]
    pub down: bool,

    /// Digest algorithm: sha1 or sha256. Inferred from the digest length when omitted.
    #[arg(long)]
    pub algorithm: Option<HashAlgorithm>,

    /// Content property the rating applies to.
    #[arg(long, default_value = DEFAULT_CONTENT_PROPERTY)]
    pub property: String,
}

/// Sign and publish a vote with the local key.
pub async fn vote(config: &CwebConfig, cmd: &VoteCmd) -> Result<(), Box<dyn std::error::Error>> {
    let hash = parse_hash(&cmd.hash, cmd.algorithm)?;
    let rating = if cmd.up { Rating::Good } else { Rating::Bad };
    let keypair = Arc::new(load_keypair(config)?);
    let node = Node::open(config)?;

    let vote = Vote::new(
        hash.clone(),
        vec![Assertion::new(cmd.property.as_str(), rating)],
    );
    match node.votes(keypair).vote(vote).await? {
        PutOutcome::Stored => println!("Voted {:?} on {}", rating, hash),
        PutOutcome::AlreadyPresent => println!("Identical vote already recorded on {}", hash),
        PutOutcome::Collision => {
            return Err(format!("Slot for {} is held by different content", hash).into())
        }
        PutOutcome::Rejected => {
            return Err("Vote was refused by admission. \
                        Is your identity registered? (`cweb register`)"
                .into())
        }
    }
    Ok(())
}

/// List every vote recorded for a content hash.
pub async fn votes(
    config: &CwebConfig,
    hash_hex: &str,
    algorithm: Option<HashAlgorithm>,
) -> Result<(), Box<dyn std::error::Error>> {
    let hash = parse_hash(hash_hex, algorithm)?;
    let node = Node::open(config)?;

    let votes = node.vote_reader().get_all_votes(&hash).await?;
    println!("{} vote(s) on {}", votes.len(), hash);
    for signed in votes {
        let signer = signed
            .signature
            .as_ref()
            .map(|s| s.signer_id().to_hex())
            .unwrap_or_else(|| "unsigned".to_string());
        for assertion in signed.vote.iter().flat_map(|v| v.assertions.iter()) {
            println!(
                "  {}  {}={:?}",
                signer,
                assertion.content_property,
                assertion.rating()
            );
        }
    }
    Ok(())
}

fn parse_hash(
    digest_hex: &str,
    algorithm: Option<HashAlgorithm>,
) -> Result<ContentHash, Box<dyn std::error::Error>> {
    let algorithm = match algorithm {
        Some(algorithm) => algorithm,
        None => match digest_hex.trim().len() {
            40 => HashAlgorithm::Sha1,
            64 => HashAlgorithm::Sha256,
            n => {
                return Err(format!(
                    "Cannot infer the algorithm of a {}-character digest; pass --algorithm",
                    n
                )
                .into())
            }
        },
    };
    Ok(ContentHash::from_hex(algorithm, digest_hex)?)
}
