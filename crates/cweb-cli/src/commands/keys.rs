// crates/cweb-cli/src/commands/keys.rs
//
// `cweb keygen` and `cweb whoami`: local key management.
//
// The node's ed25519 key lives in the keys directory as two hex files:
// `node.secret` (32-byte seed) and `node.pub` (32-byte public key).

use std::fs;
use std::path::Path;

use cweb_core::crypto::Keypair;
use cweb_core::CwebId;

use crate::config::CwebConfig;

const SECRET_FILE: &str = "node.secret";
const PUBLIC_FILE: &str = "node.pub";

/// Generate a new keypair. Refuses to replace an existing one unless `force`.
pub fn keygen(config: &CwebConfig, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let keys_dir = config.keys_path();
    let secret_path = keys_dir.join(SECRET_FILE);
    if secret_path.exists() && !force {
        return Err(format!(
            "{} already exists; pass --force to replace it",
            secret_path.display()
        )
        .into());
    }

    let keypair = Keypair::generate();
    write_keypair(&keys_dir, &keypair)?;

    println!("Keypair created successfully.");
    println!("  Public key: {}", hex::encode(keypair.public_key_bytes()));
    println!(
        "  Node id:    {}",
        CwebId::from_public_key(&keypair.public_key_bytes())
    );
    println!();
    println!("IMPORTANT: Back up your secret key file securely.");
    println!("  Secret key: {}", secret_path.display());

    Ok(())
}

/// Print the local public key and the node id derived from it.
pub fn whoami(config: &CwebConfig) -> Result<(), Box<dyn std::error::Error>> {
    let keypair = load_keypair(config)?;
    let public_key = keypair.public_key_bytes();
    println!("Public key: {}", hex::encode(public_key));
    println!("Node id:    {}", CwebId::from_public_key(&public_key));
    Ok(())
}

/// Read the node keypair from the keys directory.
pub fn load_keypair(config: &CwebConfig) -> Result<Keypair, Box<dyn std::error::Error>> {
    let path = config.keys_path().join(SECRET_FILE);
    let contents = fs::read_to_string(&path).map_err(|e| {
        format!(
            "Cannot read {}: {}. Run `cweb keygen` first.",
            path.display(),
            e
        )
    })?;
    let bytes = hex::decode(contents.trim())?;
    let secret: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("Expected a 32-byte secret key in {}", path.display()))?;
    Ok(Keypair::from_secret_bytes(&secret))
}

fn write_keypair(keys_dir: &Path, keypair: &Keypair) -> std::io::Result<()> {
    fs::create_dir_all(keys_dir)?;
    fs::write(
        keys_dir.join(SECRET_FILE),
        hex::encode(keypair.secret_key_bytes()),
    )?;
    fs::write(
        keys_dir.join(PUBLIC_FILE),
        hex::encode(keypair.public_key_bytes()),
    )
}
