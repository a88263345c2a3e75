// crates/cweb-cli/src/commands/admit.rs
//
// `cweb admit`: dry-run the admission validator over an encoded record.

use std::fs;

use cweb_core::{DomainKey, ValidationError};

use crate::config::CwebConfig;
use crate::node::Node;

pub async fn admit(
    config: &CwebConfig,
    domain: &str,
    file: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = fs::read(file)?;
    let node = Node::open(config)?;
    let key = DomainKey::from_name(domain);

    match node.admission().check(&key, &raw).await {
        Ok(true) => println!("admitted: {} record ({} bytes)", domain, raw.len()),
        Ok(false) => println!("refused: {} record ({} bytes)", domain, raw.len()),
        Err(ValidationError::AlgorithmUnsupported(tag)) => {
            println!("refused: signature algorithm tag {} is not supported", tag)
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
