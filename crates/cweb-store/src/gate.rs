// crates/cweb-store/src/gate.rs
//
// Admission hook shared by the storage substrates.
//
// The validator is installed after construction because it usually depends
// (through the key lookup) on the very substrate it guards. Until one is
// installed every write is refused.

use std::sync::{Arc, OnceLock};

use tracing::warn;

use cweb_core::{CwebError, DomainKey, IncomingDataValidator};

#[derive(Default)]
pub(crate) struct AdmissionGate {
    validator: OnceLock<Arc<dyn IncomingDataValidator>>,
}

impl AdmissionGate {
    pub(crate) fn install(
        &self,
        validator: Arc<dyn IncomingDataValidator>,
    ) -> Result<(), CwebError> {
        self.validator
            .set(validator)
            .map_err(|_| CwebError::InvalidState("admission validator already installed".into()))
    }

    pub(crate) fn is_installed(&self) -> bool {
        self.validator.get().is_some()
    }

    pub(crate) async fn admit(&self, domain: &DomainKey, raw: &[u8]) -> bool {
        match self.validator.get() {
            Some(validator) => validator.validate(domain, raw).await,
            None => {
                warn!("No admission validator installed; refusing write to domain {}", domain);
                false
            }
        }
    }
}

impl std::fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("installed", &self.is_installed())
            .finish()
    }
}
