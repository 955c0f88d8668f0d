use {
    crate::{
        AlloyProvider,
        Chain,
        Error,
        Receipt,
        node::EphemeralNode,
        wallet::{Wallet, WalletError},
    },
    alloy::{
        network::{ReceiptResponse, TransactionBuilder},
        primitives::{Address, Bytes, U256},
        providers::Provider,
        rpc::types::{TransactionReceipt, TransactionRequest},
    },
    network::{NetworkKind, NetworkProfile},
};

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("failed to start ephemeral node")]
    Node(#[from] alloy::node_bindings::NodeError),
    #[error("network {0} has no RPC endpoint")]
    MissingEndpoint(network::Network),
    #[error("failed to query chain id")]
    ChainId(#[source] Error),
    #[error("expected chain id {expected} but node reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },
}

/// [`Chain`] backed by a JSON-RPC node.
pub struct RpcChain {
    provider: AlloyProvider,
    accounts: Vec<Address>,
    chain_id: u64,
    /// Keeps the ephemeral node alive for as long as the chain is used.
    _node: Option<EphemeralNode>,
}

impl RpcChain {
    /// Connects to the node described by `profile`, starting one first for
    /// the ephemeral network. Fails if the node reports a chain id other than
    /// the one the profile expects.
    pub async fn connect(profile: &NetworkProfile) -> Result<Self, ConnectError> {
        let wallet = Wallet::from_credentials(&profile.accounts)?;
        let (node, endpoint) = match (profile.kind(), &profile.rpc_endpoint) {
            (NetworkKind::Ephemeral, _) => {
                let node = EphemeralNode::spawn()?;
                let endpoint = node.endpoint();
                (Some(node), endpoint)
            }
            (_, Some(endpoint)) => (None, endpoint.clone()),
            (_, None) => return Err(ConnectError::MissingEndpoint(profile.network)),
        };

        let provider = crate::provider(&endpoint, wallet.inner);
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|err| ConnectError::ChainId(err.into()))?;
        if let Some(expected) = profile.chain_id
            && expected != chain_id
        {
            return Err(ConnectError::ChainIdMismatch {
                expected,
                actual: chain_id,
            });
        }

        tracing::info!(network = %profile.network, chain_id, "connected");
        Ok(Self {
            provider,
            accounts: wallet.accounts,
            chain_id,
            _node: node,
        })
    }

    pub fn provider(&self) -> &AlloyProvider {
        &self.provider
    }

    fn ensure_signer(&self, from: Address) -> Result<(), Error> {
        if self.accounts.contains(&from) {
            Ok(())
        } else {
            Err(Error::UnknownSigner(from))
        }
    }

    async fn submit(&self, tx: TransactionRequest) -> Result<Receipt, Error> {
        let pending = self.provider.send_transaction(tx).await?;
        tracing::debug!(tx = ?pending.tx_hash(), "submitted transaction");
        let receipt = pending.get_receipt().await?;
        Ok(convert(&receipt))
    }
}

fn convert(receipt: &TransactionReceipt) -> Receipt {
    Receipt {
        transaction_hash: receipt.transaction_hash,
        success: receipt.status(),
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
    }
}

#[async_trait::async_trait]
impl Chain for RpcChain {
    async fn chain_id(&self) -> Result<u64, Error> {
        Ok(self.chain_id)
    }

    fn signers(&self) -> Vec<Address> {
        self.accounts.clone()
    }

    async fn balance(&self, account: Address) -> Result<U256, Error> {
        Ok(self.provider.get_balance(account).await?)
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, Error> {
        Ok(self.provider.get_code_at(address).await?)
    }

    async fn deploy(&self, from: Address, init_code: Bytes) -> Result<Receipt, Error> {
        self.ensure_signer(from)?;
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(init_code);
        self.submit(tx).await
    }

    async fn transact(&self, from: Address, to: Address, input: Bytes) -> Result<Receipt, Error> {
        self.ensure_signer(from)?;
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(input);
        self.submit(tx).await
    }
}
