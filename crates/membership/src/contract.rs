use {
    alloy::primitives::{Address, B256, Bytes},
    deployments::{DeploymentRecord, DeploymentStore, StoreError},
    ethrpc::{Chain, Receipt},
    network::{Network, NetworkProfile},
    std::sync::Arc,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{contract_name} is not deployed on {network}, run the deploy command first")]
    NotDeployed {
        contract_name: String,
        network: Network,
    },
    #[error(
        "{contract_name} was deployed on chain {recorded} but the node is on chain {connected}"
    )]
    ChainMismatch {
        contract_name: String,
        recorded: u64,
        connected: u64,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to query the chain")]
    Chain(#[source] ethrpc::Error),
}

#[derive(Debug, Error)]
pub enum ContractCallError {
    #[error("{method} from {from} reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    Revert {
        method: &'static str,
        from: Address,
        reason: Option<String>,
        /// Set if the transaction got mined before it reverted.
        transaction_hash: Option<B256>,
    },
    #[error("{method} from {from} failed")]
    Node {
        method: &'static str,
        from: Address,
        #[source]
        source: ethrpc::Error,
    },
}

impl ContractCallError {
    /// Returns whether the contract itself rejected the call.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert { .. })
    }
}

/// Reads the record of `contract_name` on the active network from the store
/// alone.
pub async fn find(
    contract_name: &str,
    profile: &NetworkProfile,
    store: &dyn DeploymentStore,
) -> Result<DeploymentRecord, LookupError> {
    store
        .get(profile.network, contract_name)
        .await?
        .ok_or_else(|| LookupError::NotDeployed {
            contract_name: contract_name.to_owned(),
            network: profile.network,
        })
}

/// A deployed contract found by name on the active network.
pub struct ContractHandle {
    pub record: DeploymentRecord,
    chain: Arc<dyn Chain>,
}

impl ContractHandle {
    /// Finds the deployment of `contract_name`. The chain is only queried
    /// once a record was found.
    pub async fn lookup(
        contract_name: &str,
        profile: &NetworkProfile,
        store: &dyn DeploymentStore,
        chain: Arc<dyn Chain>,
    ) -> Result<Self, LookupError> {
        let record = find(contract_name, profile, store).await?;
        Self::attach(record, chain).await
    }

    /// Binds a record to the connected chain after checking it was deployed
    /// there.
    pub async fn attach(
        record: DeploymentRecord,
        chain: Arc<dyn Chain>,
    ) -> Result<Self, LookupError> {
        let connected = chain.chain_id().await.map_err(LookupError::Chain)?;
        if record.chain_id != connected {
            return Err(LookupError::ChainMismatch {
                contract_name: record.contract_name,
                recorded: record.chain_id,
                connected,
            });
        }
        Ok(Self { record, chain })
    }

    pub fn address(&self) -> Address {
        self.record.address
    }

    /// Sends a transaction calling the contract and waits until it is mined.
    pub async fn transact(
        &self,
        method: &'static str,
        from: Address,
        input: Bytes,
    ) -> Result<Receipt, ContractCallError> {
        let receipt = self
            .chain
            .transact(from, self.record.address, input)
            .await
            .map_err(|err| match err {
                ethrpc::Error::Revert { reason } => ContractCallError::Revert {
                    method,
                    from,
                    reason,
                    transaction_hash: None,
                },
                source => ContractCallError::Node {
                    method,
                    from,
                    source,
                },
            })?;
        if !receipt.success {
            return Err(ContractCallError::Revert {
                method,
                from,
                reason: None,
                transaction_hash: Some(receipt.transaction_hash),
            });
        }
        tracing::debug!(method, %from, tx = %receipt.transaction_hash, "transaction mined");
        Ok(receipt)
    }
}
