//! Access to the chain a [`network::NetworkProfile`] points at.
//!
//! Everything above this crate talks to the chain through the [`Chain`]
//! trait so it can run against an in-memory double in tests. [`RpcChain`] is
//! the implementation backed by an alloy provider.

pub mod chain;
pub mod errors;
mod instrumentation;
pub mod node;
pub mod rpc;
pub mod wallet;

#[cfg(any(test, feature = "test-util"))]
pub use chain::MockChain;
pub use {
    chain::{Chain, Receipt},
    errors::Error,
    rpc::{ConnectError, RpcChain},
};
use {
    alloy::{
        network::EthereumWallet,
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    instrumentation::InstrumentationLayer,
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// Creates a provider that signs transactions with `wallet` and logs every
/// RPC request it sends.
pub fn provider(url: &Url, wallet: EthereumWallet) -> AlloyProvider {
    let rpc = ClientBuilder::default()
        .layer(InstrumentationLayer)
        .http(url.clone());
    ProviderBuilder::new()
        .wallet(wallet)
        .connect_client(rpc)
        .erased()
}
