use {
    super::{DeploymentStore, StoreError},
    crate::DeploymentRecord,
    network::Network,
    std::{
        io,
        path::{Path, PathBuf},
    },
    tokio::fs,
};

/// hardhat-deploy's on-disk layout: `<root>/<network>/<Contract>.json` with
/// the chain id of the network in `<root>/<network>/.chainId`.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const DEFAULT_DIR: &'static str = "deployments";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn network_dir(&self, network: Network) -> PathBuf {
        self.root.join(network.name())
    }

    /// Names have to stay a single file inside the network directory and must
    /// not clash with `.chainId`.
    fn record_path(&self, network: Network, contract_name: &str) -> Result<PathBuf, StoreError> {
        if contract_name.is_empty()
            || contract_name.starts_with('.')
            || contract_name.contains(['/', '\\'])
        {
            return Err(StoreError::InvalidContractName(contract_name.to_owned()));
        }
        Ok(self.network_dir(network).join(format!("{contract_name}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_owned(),
        source,
    }
}

/// Writes through a temporary file so readers never observe a partially
/// written record.
async fn write_atomically(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)
        .await
        .map_err(io_error(&temp_path))?;
    fs::rename(&temp_path, path).await.map_err(io_error(path))
}

#[async_trait::async_trait]
impl DeploymentStore for FileStore {
    async fn get(
        &self,
        network: Network,
        contract_name: &str,
    ) -> Result<Option<DeploymentRecord>, StoreError> {
        let path = self.record_path(network, contract_name)?;
        let content = match fs::read(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|source| StoreError::Parse { path, source })
    }

    async fn put(&self, record: &DeploymentRecord) -> Result<(), StoreError> {
        let path = self.record_path(record.network, &record.contract_name)?;
        let content = serde_json::to_vec_pretty(record).map_err(StoreError::Serialize)?;
        let dir = self.network_dir(record.network);
        fs::create_dir_all(&dir).await.map_err(io_error(&dir))?;

        // `.chainId` follows the record so it never describes a record that
        // failed to be written.
        write_atomically(&path, &content).await?;
        write_atomically(&dir.join(".chainId"), record.chain_id.to_string().as_bytes()).await?;

        tracing::debug!(path = %path.display(), "stored deployment record");
        Ok(())
    }
}
