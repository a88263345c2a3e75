// crates/cweb-cli/src/node.rs
//
// Node wiring: opens the configured storage substrate and assembles the
// admission pipeline around it.
//
//   substrate -> DhtKeyLookup (weak handle back to the substrate)
//             -> SignatureValidationService
//             -> DomainRegistry (vote, user)
//             -> AdmissionValidator, installed into the substrate
//
// The substrate refuses every write until the validator is installed.

use std::sync::Arc;
use std::time::Duration;

use cweb_core::crypto::Keypair;
use cweb_core::{CwebError, DhtStorage};
use cweb_store::{DhtKeyLookup, IdentityService, InMemoryDht, RocksDht, VoteService};
use cweb_verify::{AdmissionValidator, DomainRegistry, SignatureValidationService};

use crate::config::{CwebConfig, StorageBackend};

pub struct Node {
    storage: Arc<dyn DhtStorage>,
    admission: Arc<AdmissionValidator>,
}

impl Node {
    /// Open the substrate named in `config` and install admission control.
    pub fn open(config: &CwebConfig) -> Result<Self, CwebError> {
        let timeout = config.lookup_timeout();
        let (storage, admission) = match config.storage {
            StorageBackend::Memory => {
                let dht = Arc::new(InMemoryDht::new());
                let storage: Arc<dyn DhtStorage> = dht.clone();
                let admission = admission_for(&storage, timeout)?;
                dht.install_validator(admission.clone())?;
                (storage, admission)
            }
            StorageBackend::Rocksdb => {
                let path = config.db_path();
                std::fs::create_dir_all(config.data_path()).map_err(|e| {
                    CwebError::Storage(format!("Cannot create {}: {}", path.display(), e))
                })?;
                let dht = Arc::new(RocksDht::open(&path.to_string_lossy())?);
                let storage: Arc<dyn DhtStorage> = dht.clone();
                let admission = admission_for(&storage, timeout)?;
                dht.install_validator(admission.clone())?;
                tracing::info!("RocksDB substrate opened at {}", path.display());
                (storage, admission)
            }
        };

        Ok(Self { storage, admission })
    }

    pub fn admission(&self) -> &AdmissionValidator {
        &self.admission
    }

    pub fn identities(&self) -> IdentityService {
        IdentityService::new(self.storage.clone())
    }

    pub fn votes(&self, keypair: Arc<Keypair>) -> VoteService {
        VoteService::new(self.storage.clone(), keypair)
    }

    pub fn vote_reader(&self) -> VoteService {
        VoteService::read_only(self.storage.clone())
    }
}

fn admission_for(
    storage: &Arc<dyn DhtStorage>,
    lookup_timeout: Duration,
) -> Result<Arc<AdmissionValidator>, CwebError> {
    let lookup = Arc::new(DhtKeyLookup::new(storage));
    let signatures =
        Arc::new(SignatureValidationService::new(lookup).with_lookup_timeout(lookup_timeout));
    let registry = DomainRegistry::standard(signatures)?;
    tracing::debug!("Admitting domains: {:?}", registry.names());
    Ok(Arc::new(AdmissionValidator::new(Arc::new(registry))))
}
