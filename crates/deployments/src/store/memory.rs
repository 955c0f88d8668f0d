use {
    super::{DeploymentStore, StoreError},
    crate::DeploymentRecord,
    network::Network,
    std::collections::HashMap,
    tokio::sync::RwLock,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<(Network, String), DeploymentRecord>>,
}

#[async_trait::async_trait]
impl DeploymentStore for InMemoryStore {
    async fn get(
        &self,
        network: Network,
        contract_name: &str,
    ) -> Result<Option<DeploymentRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .await
            .get(&(network, contract_name.to_owned()))
            .cloned())
    }

    async fn put(&self, record: &DeploymentRecord) -> Result<(), StoreError> {
        self.records.write().await.insert(
            (record.network, record.contract_name.clone()),
            record.clone(),
        );
        Ok(())
    }
}
