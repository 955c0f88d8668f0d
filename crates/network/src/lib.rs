//! Selection of the network the harness runs against. A [`NetworkProfile`]
//! bundles everything the other components need to know about it: chain id,
//! RPC endpoint and the signing credentials, in order.
//!
//! Profiles are resolved once per run and then passed around explicitly.

pub mod config;
pub mod credentials;
pub mod named_accounts;

pub use {
    config::{Configuration, NetworkOverride},
    credentials::{Credential, Secret},
    named_accounts::{NamedAccount, NamedAccounts},
};
use {
    serde::{Deserialize, Serialize},
    std::{fmt, path::PathBuf, str::FromStr},
    thiserror::Error,
    url::Url,
};

/// Chain id of Hardhat's in-process network and of local development nodes.
pub const DEV_CHAIN_ID: u64 = 31337;

/// Where a local development node listens unless configured otherwise.
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://127.0.0.1:8545";

/// Represents each available network
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    /// Chain that only lives as long as the harness process.
    #[default]
    Hardhat,
    /// Development node running on this machine.
    Localhost,
    /// Polygon's Mumbai test network.
    PolygonMumbai,
}

impl Network {
    pub const ALL: [Network; 3] = [Self::Hardhat, Self::Localhost, Self::PolygonMumbai];

    /// Returns the name used to select the network and to key deployments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hardhat => "hardhat",
            Self::Localhost => "localhost",
            Self::PolygonMumbai => "polygon_mumbai",
        }
    }

    pub fn kind(&self) -> NetworkKind {
        match self {
            Self::Hardhat => NetworkKind::Ephemeral,
            Self::Localhost => NetworkKind::Local,
            Self::PolygonMumbai => NetworkKind::Remote,
        }
    }

    /// Returns the network's chain ID, or `None` if it is whatever the remote
    /// node reports.
    pub fn default_chain_id(&self) -> Option<u64> {
        match self.kind() {
            NetworkKind::Ephemeral | NetworkKind::Local => Some(DEV_CHAIN_ID),
            NetworkKind::Remote => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|network| network.name() == s)
            .ok_or_else(|| ConfigurationError::UnknownNetwork(s.to_owned()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkKind {
    /// In-process chain, state is lost when the process exits.
    Ephemeral,
    /// Persistent development node with pre-funded accounts.
    Local,
    /// Public network that needs real credentials.
    Remote,
}

impl NetworkKind {
    pub fn is_development(&self) -> bool {
        !matches!(self, Self::Remote)
    }
}

/// Settings taken from the process environment (or the matching command line
/// flags).
#[derive(Clone, Default)]
pub struct Environment {
    /// Endpoint of the remote test network (`RPC_URL`).
    pub rpc_url: Option<String>,
    /// Signing key for the remote test network (`PRIVATE_KEY`).
    pub private_key: Option<String>,
}

impl Environment {
    fn rpc_url(&self) -> Option<&str> {
        non_empty(self.rpc_url.as_deref())
    }

    fn private_key(&self) -> Option<&str> {
        non_empty(self.private_key.as_deref())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "SECRET"))
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// The network a run targets, with everything needed to connect and sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkProfile {
    pub network: Network,
    /// Expected chain id. `None` means the chain id reported by the node is
    /// accepted as is.
    pub chain_id: Option<u64>,
    /// `None` for the ephemeral network which is started by the harness itself.
    pub rpc_endpoint: Option<Url>,
    /// Signing credentials, in the order accounts are handed out.
    pub accounts: Vec<Credential>,
}

impl NetworkProfile {
    /// Builds the profile for `network` from the environment and the optional
    /// configuration file.
    pub fn resolve(
        network: Network,
        env: &Environment,
        config: &Configuration,
    ) -> Result<Self, ConfigurationError> {
        let overrides = config.network(network);
        if let (Some(expected), Some(configured)) = (network.default_chain_id(), overrides.chain_id)
        {
            if expected != configured {
                return Err(ConfigurationError::FixedChainId {
                    network,
                    expected,
                    configured,
                });
            }
        }

        let profile = match network.kind() {
            NetworkKind::Ephemeral => {
                if overrides.url.is_some() {
                    return Err(ConfigurationError::EphemeralEndpoint(network));
                }
                Self {
                    network,
                    chain_id: network.default_chain_id(),
                    rpc_endpoint: None,
                    accounts: Credential::dev_accounts(),
                }
            }
            NetworkKind::Local => Self {
                network,
                chain_id: network.default_chain_id(),
                rpc_endpoint: Some(match overrides.url {
                    Some(url) => url,
                    None => parse_endpoint(network, DEFAULT_LOCAL_ENDPOINT)?,
                }),
                accounts: Credential::dev_accounts(),
            },
            NetworkKind::Remote => {
                let rpc_endpoint = match env.rpc_url() {
                    Some(url) => parse_endpoint(network, url)?,
                    None => overrides
                        .url
                        .ok_or(ConfigurationError::MissingRpcEndpoint(network))?,
                };
                Self {
                    network,
                    chain_id: overrides.chain_id,
                    rpc_endpoint: Some(rpc_endpoint),
                    accounts: vec![remote_credential(network, env)?],
                }
            }
        };

        tracing::debug!(
            network = %profile.network,
            chain_id = ?profile.chain_id,
            endpoint = ?profile.rpc_endpoint.as_ref().map(Url::as_str),
            accounts = profile.accounts.len(),
            "resolved network profile"
        );
        Ok(profile)
    }

    pub fn name(&self) -> &'static str {
        self.network.name()
    }

    pub fn kind(&self) -> NetworkKind {
        self.network.kind()
    }
}

fn parse_endpoint(network: Network, url: &str) -> Result<Url, ConfigurationError> {
    Url::parse(url).map_err(|source| ConfigurationError::InvalidRpcEndpoint { network, source })
}

/// Remote networks sign with a real key only. The placeholder that
/// development setups fall back to is refused even when set explicitly.
fn remote_credential(network: Network, env: &Environment) -> Result<Credential, ConfigurationError> {
    let key = env
        .private_key()
        .ok_or(ConfigurationError::MissingCredential(network))?;
    if key == credentials::PLACEHOLDER_PRIVATE_KEY {
        return Err(ConfigurationError::PlaceholderCredential(network));
    }
    Ok(Credential::PrivateKey(Secret::new(key)))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown network {0:?}, expected one of hardhat, localhost, polygon_mumbai")]
    UnknownNetwork(String),
    #[error("network {0} requires an RPC endpoint, set RPC_URL")]
    MissingRpcEndpoint(Network),
    #[error("invalid RPC endpoint for network {network}")]
    InvalidRpcEndpoint {
        network: Network,
        #[source]
        source: url::ParseError,
    },
    #[error("network {0} requires a signing key, set PRIVATE_KEY")]
    MissingCredential(Network),
    #[error("network {0} cannot sign with the placeholder key, set PRIVATE_KEY")]
    PlaceholderCredential(Network),
    #[error("network {0} is started by the harness and takes no RPC endpoint")]
    EphemeralEndpoint(Network),
    #[error("network {network} has chain id {expected} but {configured} is configured")]
    FixedChainId {
        network: Network,
        expected: u64,
        configured: u64,
    },
    #[error("unknown named account {0:?}")]
    UnknownNamedAccount(String),
    #[error(
        "named account {role:?} refers to account #{index} but network {network} has \
         {available} accounts"
    )]
    AccountIndexOutOfRange {
        role: String,
        index: usize,
        network: Network,
        available: usize,
    },
    #[error("failed to load configuration from {}: {reason}", path.display())]
    File { path: PathBuf, reason: String },
}
