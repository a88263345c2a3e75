// crates/cweb-core/src/crypto.rs

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::CwebError;

/// An ed25519 keypair. The signing half never leaves its owner.
pub struct Keypair {
    pub signing_key: SigningKey,
    pub verifying_key: VerifyingKey,
}

impl Keypair {
    /// Generate a new random ed25519 keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_signing_key(signing_key)
    }

    /// Rebuild a keypair from its 32-byte secret.
    pub fn from_secret_bytes(secret: &[u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(secret))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifying_key = signing_key.verifying_key();
        Keypair {
            signing_key,
            verifying_key,
        }
    }

    /// Get the public key bytes (32 bytes).
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key.to_bytes()
    }

    /// Get the secret key bytes (32 bytes).
    pub fn secret_key_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Sign a message and return the 64 signature bytes.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        let signature = self.signing_key.sign(message);
        signature.to_bytes().to_vec()
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &hex::encode(self.public_key_bytes()))
            .finish_non_exhaustive()
    }
}

/// Verify an ed25519 signature over `message`.
///
/// Returns `Ok(false)` for a well-formed signature that does not verify and
/// `Err(CwebError::Crypto)` when the key or signature bytes are malformed.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<bool, CwebError> {
    let key_array: [u8; 32] = public_key_bytes
        .try_into()
        .map_err(|_| CwebError::Crypto("Public key must be exactly 32 bytes".to_string()))?;
    let verifying_key = VerifyingKey::from_bytes(&key_array)
        .map_err(|e| CwebError::Crypto(format!("Invalid public key: {}", e)))?;

    let signature_array: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| CwebError::Crypto("Signature must be exactly 64 bytes".to_string()))?;

    let signature = ed25519_dalek::Signature::from_bytes(&signature_array);

    match verifying_key.verify(message, &signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Compute SHA-256 hash of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute SHA-1 hash of the given bytes.
pub fn sha1_bytes(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 20];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_sign_verify() {
        let keypair = Keypair::generate();
        let message = b"hello cweb";

        let signature = keypair.sign(message);
        let pubkey = keypair.public_key_bytes();

        assert!(verify_signature(&pubkey, message, &signature).unwrap());
        assert!(!verify_signature(&pubkey, b"wrong message", &signature).unwrap());
    }

    #[test]
    fn test_secret_roundtrip() {
        let keypair = Keypair::generate();
        let restored = Keypair::from_secret_bytes(&keypair.secret_key_bytes());
        assert_eq!(keypair.public_key_bytes(), restored.public_key_bytes());
    }

    #[test]
    fn test_malformed_material_is_error() {
        let keypair = Keypair::generate();
        let signature = keypair.sign(b"m");
        assert!(verify_signature(&[1u8; 7], b"m", &signature).is_err());
        assert!(verify_signature(&keypair.public_key_bytes(), b"m", &[0u8; 10]).is_err());
    }

    #[test]
    fn test_hash_widths() {
        assert_eq!(hash_bytes(b"x").len(), 32);
        assert_eq!(sha1_bytes(b"x").len(), 20);
        assert_eq!(hash_bytes(b"x"), hash_bytes(b"x"));
        assert_ne!(sha1_bytes(b"x"), sha1_bytes(b"y"));
    }
}
