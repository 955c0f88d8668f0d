use {
    crate::Error,
    alloy::primitives::{Address, B256, Bytes, U256},
};

/// Outcome of a transaction that made it into a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    /// `false` if the transaction reverted after inclusion.
    pub success: bool,
    /// Address of the created contract for deployment transactions.
    pub contract_address: Option<Address>,
    pub gas_used: u64,
}

/// Operations the harness performs against a chain.
///
/// Transaction methods wait for the receipt before returning, so callers
/// that await them one after the other get strictly sequential execution.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait Chain: Send + Sync {
    /// Chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, Error>;

    /// Accounts this chain handle can sign for, in network-defined order.
    fn signers(&self) -> Vec<Address>;

    async fn balance(&self, account: Address) -> Result<U256, Error>;

    /// Runtime bytecode at `address`, empty if no contract lives there.
    async fn code_at(&self, address: Address) -> Result<Bytes, Error>;

    /// Submits a contract creation transaction and waits for its receipt.
    async fn deploy(&self, from: Address, init_code: Bytes) -> Result<Receipt, Error>;

    /// Submits a transaction calling `to` and waits for its receipt.
    async fn transact(&self, from: Address, to: Address, input: Bytes) -> Result<Receipt, Error>;
}
