use {
    crate::{ConfigurationError, NamedAccount, NamedAccounts, Network},
    serde::{Deserialize, Serialize},
    std::{collections::BTreeMap, path::Path},
    url::Url,
};

/// Optional TOML file adjusting the built-in network profiles.
///
/// ```toml
/// [networks.localhost]
/// url = "http://127.0.0.1:8545"
///
/// [networks.polygon_mumbai]
/// chain-id = 80001
///
/// [named-accounts.deployer]
/// default = 0
/// networks = { polygon_mumbai = 0 }
/// ```
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    /// Per network overrides keyed by network name.
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkOverride>,

    /// Named accounts in addition to (or replacing) the built-in `deployer`.
    #[serde(default)]
    pub named_accounts: BTreeMap<String, NamedAccount>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NetworkOverride {
    pub url: Option<Url>,
    pub chain_id: Option<u64>,
}

impl Configuration {
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|err| ConfigurationError::File {
                    path: path.to_owned(),
                    reason: err.to_string(),
                })?;
        match toml::from_str::<Self>(&content) {
            Ok(config) => config.validate(),
            Err(err) if std::env::var("TOML_TRACE_ERROR").is_ok_and(|v| v == "1") => {
                Err(ConfigurationError::File {
                    path: path.to_owned(),
                    reason: format!("{err:#?}"),
                })
            }
            Err(_) => Err(ConfigurationError::File {
                path: path.to_owned(),
                reason: "TOML syntax error. Set TOML_TRACE_ERROR=1 to print parsing error but \
                         this may leak secrets"
                    .to_owned(),
            }),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        toml::from_str::<Self>(content)
            .map_err(|err| ConfigurationError::File {
                path: Default::default(),
                reason: err.to_string(),
            })?
            .validate()
    }

    /// Checks that every network named in the file exists.
    pub fn validate(self) -> Result<Self, ConfigurationError> {
        let named_account_networks = self
            .named_accounts
            .values()
            .flat_map(|account| account.networks.keys());
        for name in self.networks.keys().chain(named_account_networks) {
            name.parse::<Network>()?;
        }
        Ok(self)
    }

    pub fn network(&self, network: Network) -> NetworkOverride {
        self.networks
            .get(network.name())
            .cloned()
            .unwrap_or_default()
    }

    pub fn named_accounts(&self) -> NamedAccounts {
        self.named_accounts
            .iter()
            .fold(NamedAccounts::default(), |accounts, (role, account)| {
                accounts.with(role.clone(), account.clone())
            })
    }
}
