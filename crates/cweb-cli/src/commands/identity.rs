// crates/cweb-cli/src/commands/identity.rs
//
// `cweb register` and `cweb lookup`: publish and resolve identities.

use cweb_core::{CwebId, PutOutcome};

use crate::commands::keys::load_keypair;
use crate::config::CwebConfig;
use crate::node::Node;

/// Self-sign the local key under `handle` and publish it to the user domain.
pub async fn register(
    config: &CwebConfig,
    handle: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(config)?;
    let node = Node::open(config)?;

    let (record, outcome) = node.identities().register(handle, &keypair).await?;
    let user = record.user.as_ref().ok_or("identity record has no user")?;
    match outcome {
        PutOutcome::Stored => println!("Registered {}", user),
        PutOutcome::AlreadyPresent => println!("Already registered: {}", user),
        PutOutcome::Collision => {
            return Err(format!(
                "Another identity already occupies the slot of {}",
                user.id()
            )
            .into())
        }
        PutOutcome::Rejected => return Err("Identity record was refused by admission".into()),
    }
    Ok(())
}

/// Resolve a hex public key to its registered identities.
pub async fn lookup(
    config: &CwebConfig,
    public_key_hex: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let public_key = hex::decode(public_key_hex.trim())?;
    let node = Node::open(config)?;

    let records = node.identities().find_by_public_key(&public_key).await?;
    if records.is_empty() {
        println!(
            "No identity registered for {}",
            CwebId::from_public_key(&public_key)
        );
        return Ok(());
    }
    for record in records {
        if let Some(user) = record.user {
            println!("{}  handle={}", user.id(), user.handle);
        }
    }
    Ok(())
}
