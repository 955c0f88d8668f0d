use {
    alloy::{
        network::EthereumWallet,
        primitives::Address,
        signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English},
    },
    network::{Credential, credentials::DEV_MNEMONIC},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("no signing credentials configured")]
    NoAccounts,
    #[error("failed to derive development account #{index}")]
    DevAccount {
        index: u32,
        #[source]
        source: alloy::signers::local::LocalSignerError,
    },
    /// The key itself is deliberately left out of the message.
    #[error("invalid private key for account #{0}")]
    InvalidPrivateKey(usize),
}

/// Signing wallet together with the account order it was built from.
#[derive(Clone, Debug)]
pub struct Wallet {
    pub inner: EthereumWallet,
    /// Addresses in the order of the credentials.
    pub accounts: Vec<Address>,
}

impl Wallet {
    pub fn from_credentials(credentials: &[Credential]) -> Result<Self, WalletError> {
        let signers = credentials
            .iter()
            .enumerate()
            .map(|(position, credential)| signer(position, credential))
            .collect::<Result<Vec<_>, _>>()?;
        let accounts: Vec<_> = signers.iter().map(PrivateKeySigner::address).collect();

        let mut signers = signers.into_iter();
        let mut inner = EthereumWallet::new(signers.next().ok_or(WalletError::NoAccounts)?);
        for signer in signers {
            inner.register_signer(signer);
        }
        Ok(Self { inner, accounts })
    }
}

fn signer(position: usize, credential: &Credential) -> Result<PrivateKeySigner, WalletError> {
    match credential {
        Credential::DevMnemonic { index } => MnemonicBuilder::<English>::default()
            .phrase(DEV_MNEMONIC)
            .index(*index)
            .and_then(|builder| builder.build())
            .map_err(|source| WalletError::DevAccount {
                index: *index,
                source,
            }),
        Credential::PrivateKey(key) => key
            .expose()
            .parse()
            .map_err(|_| WalletError::InvalidPrivateKey(position)),
    }
}
