//! Registries of deployed contracts, keyed by network and contract name.

mod file;
mod memory;

pub use {file::FileStore, memory::InMemoryStore};
use {
    crate::DeploymentRecord,
    network::{Network, NetworkKind, NetworkProfile},
    std::{
        io,
        path::{Path, PathBuf},
        sync::Arc,
    },
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed deployment record {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize deployment record")]
    Serialize(#[source] serde_json::Error),
    #[error("{0:?} cannot be stored as a contract name")]
    InvalidContractName(String),
}

/// Where deployment records live. Writing a record for a key that already
/// has one replaces it.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait DeploymentStore: Send + Sync {
    async fn get(
        &self,
        network: Network,
        contract_name: &str,
    ) -> Result<Option<DeploymentRecord>, StoreError>;

    async fn put(&self, record: &DeploymentRecord) -> Result<(), StoreError>;
}

/// Picks the registry for `profile`. Deployments on the ephemeral network
/// don't outlive the process so they are kept in memory.
pub fn store_for(profile: &NetworkProfile, dir: &Path) -> Arc<dyn DeploymentStore> {
    match profile.kind() {
        NetworkKind::Ephemeral => Arc::new(InMemoryStore::default()),
        NetworkKind::Local | NetworkKind::Remote => Arc::new(FileStore::new(dir)),
    }
}
