use {
    alloy::node_bindings::{Anvil, AnvilInstance, NodeError},
    network::{DEV_CHAIN_ID, credentials::DEV_MNEMONIC},
    url::Url,
};

/// Development node started by the harness. It lives as long as this value
/// and all state is lost once it is dropped.
pub struct EphemeralNode {
    instance: AnvilInstance,
}

impl EphemeralNode {
    /// Spawns an `anvil` process on a free port with the development
    /// accounts pre-funded.
    pub fn spawn() -> Result<Self, NodeError> {
        let instance = Anvil::new()
            .chain_id(DEV_CHAIN_ID)
            .mnemonic(DEV_MNEMONIC)
            .try_spawn()?;
        tracing::info!(endpoint = %instance.endpoint(), "started ephemeral node");
        Ok(Self { instance })
    }

    pub fn endpoint(&self) -> Url {
        self.instance.endpoint_url()
    }
}

impl Drop for EphemeralNode {
    fn drop(&mut self) {
        tracing::debug!(endpoint = %self.instance.endpoint(), "stopping ephemeral node");
    }
}
