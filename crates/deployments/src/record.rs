use {
    alloy::{
        json_abi::JsonAbi,
        primitives::{Address, B256, Bytes},
    },
    network::Network,
    serde::{Deserialize, Serialize},
};

/// Everything known about a contract deployment once its transaction got
/// mined. Stored in the same shape hardhat-deploy uses so existing tooling
/// can read it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub contract_name: String,
    pub address: Address,
    pub abi: JsonAbi,
    pub network: Network,
    pub chain_id: u64,
    pub transaction_hash: B256,
    pub deployer: Address,
    /// ABI encoded constructor arguments.
    pub args: Bytes,
    /// keccak256 of the creation bytecode without arguments.
    pub bytecode_hash: B256,
    /// How many times the contract has been deployed under this name on
    /// this network, this deployment included.
    pub num_deployments: u32,
}
