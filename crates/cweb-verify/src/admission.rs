// crates/cweb-verify/src/admission.rs
//
// AdmissionValidator: the gate every incoming write passes through.
//
// Looks the target domain up in the registry, decodes the raw bytes as that
// domain's record type, and runs the domain's validator. Anything it cannot
// positively accept is refused, including writes to unregistered domains.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use cweb_core::{DomainKey, IncomingDataValidator, ValidationError};

use crate::registry::DomainRegistry;

#[derive(Debug, Clone)]
pub struct AdmissionValidator {
    registry: Arc<DomainRegistry>,
}

impl AdmissionValidator {
    /// Admission over the domains in `registry`.
    pub fn new(registry: Arc<DomainRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    /// Admission verdict for `raw` arriving in `domain`.
    ///
    /// Decode failures and collaborator faults are folded into `Ok(false)`.
    ///
    /// # Errors
    /// `AlgorithmUnsupported` when the record is signed with an algorithm this
    /// peer does not implement.
    pub async fn check(&self, domain: &DomainKey, raw: &[u8]) -> Result<bool, ValidationError> {
        let Some(entry) = self.registry.get(domain) else {
            debug!("Refusing write to unregistered domain {}", domain);
            return Ok(false);
        };

        match entry.validator.validate_raw(raw).await {
            Ok(admitted) => {
                debug!(
                    "{} record ({} bytes): {}",
                    entry.name,
                    raw.len(),
                    if admitted { "admitted" } else { "refused" }
                );
                Ok(admitted)
            }
            Err(ValidationError::AlgorithmUnsupported(tag)) => {
                Err(ValidationError::AlgorithmUnsupported(tag))
            }
            Err(e) => {
                debug!("Refusing {} record: {}", entry.name, e);
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl IncomingDataValidator for AdmissionValidator {
    async fn validate(&self, domain: &DomainKey, raw: &[u8]) -> bool {
        match self.check(domain, raw).await {
            Ok(admitted) => admitted,
            Err(e) => {
                warn!("Cannot evaluate record for domain {}: {}", domain, e);
                false
            }
        }
    }
}
