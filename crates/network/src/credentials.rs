use std::fmt;

/// Mnemonic of the pre-funded accounts on Hardhat and Anvil development
/// chains.
pub const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Number of pre-funded development accounts handed out per network.
pub const DEV_ACCOUNT_COUNT: u32 = 10;

/// Value development setups substitute for a missing `PRIVATE_KEY`. It is
/// not a key and never accepted for a remote network.
pub const PLACEHOLDER_PRIVATE_KEY: &str = "privatKey";

/// Reference to something that can sign transactions. The key material is
/// opaque to this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credential {
    /// Account `index` derived from [`DEV_MNEMONIC`].
    DevMnemonic { index: u32 },
    /// Hex encoded private key.
    PrivateKey(Secret),
}

impl Credential {
    pub fn dev_accounts() -> Vec<Self> {
        (0..DEV_ACCOUNT_COUNT)
            .map(|index| Self::DevMnemonic { index })
            .collect()
    }
}

/// String that is never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SECRET")
    }
}
