use {
    crate::{ConfigurationError, NetworkProfile},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Account index a role maps to, optionally different per network.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NamedAccount {
    pub default: usize,
    /// Overrides keyed by network name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub networks: BTreeMap<String, usize>,
}

impl NamedAccount {
    pub fn new(default: usize) -> Self {
        Self {
            default,
            networks: Default::default(),
        }
    }

    pub fn index_for(&self, profile: &NetworkProfile) -> usize {
        self.networks
            .get(profile.name())
            .copied()
            .unwrap_or(self.default)
    }
}

/// Role names mapped to indices into the active profile's accounts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedAccounts(BTreeMap<String, NamedAccount>);

impl NamedAccounts {
    pub const DEPLOYER: &'static str = "deployer";

    pub fn with(mut self, role: impl Into<String>, account: NamedAccount) -> Self {
        self.0.insert(role.into(), account);
        self
    }

    /// Returns the index of the account `role` maps to on `profile`.
    pub fn resolve(&self, role: &str, profile: &NetworkProfile) -> Result<usize, ConfigurationError> {
        let index = self
            .0
            .get(role)
            .ok_or_else(|| ConfigurationError::UnknownNamedAccount(role.to_owned()))?
            .index_for(profile);
        if index >= profile.accounts.len() {
            return Err(ConfigurationError::AccountIndexOutOfRange {
                role: role.to_owned(),
                index,
                network: profile.network,
                available: profile.accounts.len(),
            });
        }
        Ok(index)
    }
}

impl Default for NamedAccounts {
    fn default() -> Self {
        Self(BTreeMap::from([(
            Self::DEPLOYER.to_owned(),
            NamedAccount::new(0),
        )]))
    }
}
