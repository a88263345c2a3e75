// crates/cweb-verify/src/signature.rs
//
// SignatureValidationService: checks signatures at two trust levels.
//
//   - Self-signed: the signature must verify under the public key of the
//     identity presented alongside it. Used for identity records, which have
//     nothing earlier in the network to be checked against.
//   - Network-verified: the signing key is first resolved to an identity that
//     was already admitted into the network, then checked self-signed against
//     that identity. Used for votes, so that a throwaway key cannot vote.
//
// Rejections are `Ok(false)`. The only error that escapes is
// `ValidationError::AlgorithmUnsupported`.

use std::sync::Arc;
use std::time::Duration;

use prost::Message;
use tokio::task::AbortHandle;
use tracing::debug;

use cweb_core::crypto;
use cweb_core::{
    KeyLookup, Rating, Signature, SignatureAlgorithm, SignedUser, SignedVote, User,
    ValidationError,
};

/// Upper bound on one key lookup before the validation is abandoned.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Aborts the lookup task once nothing is waiting on it any more.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub struct SignatureValidationService {
    key_lookup: Arc<dyn KeyLookup>,
    lookup_timeout: Duration,
}

impl SignatureValidationService {
    /// A service resolving signers through `key_lookup`, with the default
    /// lookup timeout.
    pub fn new(key_lookup: Arc<dyn KeyLookup>) -> Self {
        Self {
            key_lookup,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Replace the lookup timeout.
    pub fn with_lookup_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Verify `signature` over `data` as produced by `owner`.
    ///
    /// # Errors
    /// `AlgorithmUnsupported` when the signature's algorithm tag is unknown or
    /// the unrecognized sentinel, whatever the key and data contain.
    pub fn validate_self_signed(
        &self,
        signature: &Signature,
        owner: &User,
        data: &[u8],
    ) -> Result<bool, ValidationError> {
        debug!(
            "Attempting to validate: {} from {} against '{}'",
            signature,
            owner,
            hex::encode(data)
        );

        match SignatureAlgorithm::try_from(signature.algorithm) {
            Ok(SignatureAlgorithm::Ed25519) => {}
            Ok(SignatureAlgorithm::Unrecognized) | Err(_) => {
                return Err(ValidationError::AlgorithmUnsupported(signature.algorithm));
            }
        }

        // The credential must belong to whoever presents it.
        if owner.public_key != signature.public_key {
            debug!("Validation failed: signature key does not match {}", owner);
            return Ok(false);
        }

        match crypto::verify_signature(&signature.public_key, data, &signature.signature) {
            Ok(valid) => {
                debug!("Signature check for {}: {}", owner, valid);
                Ok(valid)
            }
            Err(e) => {
                debug!("Validation failed: malformed signature material: {}", e);
                Ok(false)
            }
        }
    }

    /// Resolve the signing key to a registered identity, then verify
    /// `signature` over `data` against that identity.
    ///
    /// Waits for the lookup for at most the configured timeout. A lookup that
    /// fails, panics, or times out is logged and rejects.
    pub async fn validate_and_check_signature_key_in_network(
        &self,
        signature: &Signature,
        data: &[u8],
    ) -> Result<bool, ValidationError> {
        debug!(
            "Attempting to validate: {} against '{}'",
            signature,
            hex::encode(data)
        );

        let owner = match self.find_owner(&signature.public_key).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                debug!("Validation failed: Owner not found for {}.", signature);
                return Ok(false);
            }
            Err(fault) => {
                debug!("Validation failed: {}", fault);
                return Ok(false);
            }
        };

        match owner.user.as_ref() {
            Some(user) => self.validate_self_signed(signature, user, data),
            None => {
                debug!("Validation failed: owner record for {} has no user", signature);
                Ok(false)
            }
        }
    }

    /// Votes must be signed by an identity the network already knows, be
    /// about a well-formed content hash, and rate only GOOD or BAD.
    pub async fn validate_vote(&self, signed_vote: &SignedVote) -> Result<bool, ValidationError> {
        let (Some(vote), Some(signature)) = (&signed_vote.vote, &signed_vote.signature) else {
            debug!("Validation failed: incomplete vote record");
            return Ok(false);
        };
        match &vote.content_hash {
            Some(hash) if hash.is_well_formed() => {}
            _ => {
                debug!("Validation failed: vote without a well-formed content hash");
                return Ok(false);
            }
        }
        let rated = |tag: i32| matches!(Rating::try_from(tag), Ok(Rating::Good | Rating::Bad));
        if !vote.assertions.iter().all(|a| rated(a.rating)) {
            debug!("Validation failed: vote carries an unspecified or unknown rating");
            return Ok(false);
        }
        self.validate_and_check_signature_key_in_network(signature, &vote.encode_to_vec())
            .await
    }

    /// Identities vouch for themselves at registration.
    pub fn validate_user(&self, signed_user: &SignedUser) -> Result<bool, ValidationError> {
        let (Some(user), Some(signature)) = (&signed_user.user, &signed_user.signature) else {
            debug!("Validation failed: incomplete user record");
            return Ok(false);
        };
        self.validate_self_signed(signature, user, &user.encode_to_vec())
    }

    /// Run the lookup on its own task so that a panic or a timeout is
    /// observed here as a fault instead of unwinding into the caller.
    async fn find_owner(&self, public_key: &[u8]) -> Result<Option<SignedUser>, ValidationError> {
        let lookup = self.key_lookup.clone();
        let key = public_key.to_vec();
        let task = tokio::spawn(async move { lookup.find_owner(&key).await });
        let _abort = AbortOnDrop(task.abort_handle());

        match tokio::time::timeout(self.lookup_timeout, task).await {
            Ok(Ok(Ok(owner))) => Ok(owner),
            Ok(Ok(Err(e))) => Err(ValidationError::CollaboratorFault(format!(
                "key lookup failed: {}",
                e
            ))),
            Ok(Err(join_error)) => Err(ValidationError::CollaboratorFault(format!(
                "key lookup interrupted: {}",
                join_error
            ))),
            Err(_) => Err(ValidationError::CollaboratorFault(format!(
                "key lookup timed out after {:?}",
                self.lookup_timeout
            ))),
        }
    }
}

impl std::fmt::Debug for SignatureValidationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureValidationService")
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}
