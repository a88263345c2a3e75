// crates/cweb-cli/src/config.rs
//
// Runtime configuration for the cweb node.
// Loaded from a TOML file or populated with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cweb_core::CwebError;

/// Which storage substrate backs the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local; everything is lost on exit.
    Memory,
    /// Persistent RocksDB database under `data_dir`.
    Rocksdb,
}

/// Runtime configuration for the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CwebConfig {
    /// Directory for local data storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Storage substrate: "memory" or "rocksdb".
    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    /// Directory holding the node's hex-encoded key files.
    #[serde(default = "default_keys_dir")]
    pub keys_dir: String,

    /// How long a network-verified signature check waits for a key lookup.
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    "~/.cweb/data".to_string()
}

fn default_storage() -> StorageBackend {
    StorageBackend::Rocksdb
}

fn default_keys_dir() -> String {
    "~/.cweb/keys".to_string()
}

fn default_lookup_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CwebConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage: default_storage(),
            keys_dir: default_keys_dir(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            log_level: default_log_level(),
        }
    }
}

impl CwebConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CwebError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CwebError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, CwebError> {
        toml::from_str(contents).map_err(|e| CwebError::Config(format!("Invalid config: {}", e)))
    }

    pub fn data_path(&self) -> PathBuf {
        expand_tilde(&self.data_dir)
    }

    pub fn keys_path(&self) -> PathBuf {
        expand_tilde(&self.keys_dir)
    }

    /// Location of the RocksDB database inside `data_dir`.
    pub fn db_path(&self) -> PathBuf {
        self.data_path().join("dht_rocksdb")
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Expand a leading `~/` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
