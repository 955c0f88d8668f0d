//! Deploys compiled contracts and keeps track of where they ended up.

mod record;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub use store::MockDeploymentStore;
pub use {
    record::DeploymentRecord,
    store::{DeploymentStore, FileStore, InMemoryStore, StoreError, store_for},
};
use {
    alloy::{
        dyn_abi::DynSolValue,
        primitives::{Address, B256},
    },
    contracts::{ArgumentError, ArtifactError, ArtifactSource},
    ethrpc::Chain,
    network::NetworkProfile,
    std::sync::Arc,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error("failed to load artifact for {contract_name}")]
    UnknownArtifact {
        contract_name: String,
        #[source]
        source: ArtifactError,
    },
    #[error("invalid constructor arguments for {contract_name}")]
    ArgumentMismatch {
        contract_name: String,
        #[source]
        source: ArgumentError,
    },
    #[error("{0} is not an account of the active network")]
    UnknownDeployer(Address),
    #[error("deployer {0} has no funds")]
    Unfunded(Address),
    #[error("node rejected the deployment transaction")]
    Rejected(#[source] ethrpc::Error),
    #[error("deployment reverted: {}", reason.as_deref().unwrap_or("no reason given"))]
    Reverted {
        transaction_hash: Option<B256>,
        reason: Option<String>,
    },
    #[error("failed to query the chain")]
    Chain(#[source] ethrpc::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A contract creation transaction was mined.
    Deployed,
    /// An identical deployment already existed and was returned as is.
    Reused,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Deployment {
    pub record: DeploymentRecord,
    pub outcome: Outcome,
}

/// Deploys contracts on the network of a single profile.
pub struct Deployer {
    profile: NetworkProfile,
    chain: Arc<dyn Chain>,
    artifacts: Arc<dyn ArtifactSource>,
    store: Arc<dyn DeploymentStore>,
}

impl Deployer {
    pub fn new(
        profile: NetworkProfile,
        chain: Arc<dyn Chain>,
        artifacts: Arc<dyn ArtifactSource>,
        store: Arc<dyn DeploymentStore>,
    ) -> Self {
        Self {
            profile,
            chain,
            artifacts,
            store,
        }
    }

    /// Deploys `contract_name` from `deployer` unless the same code with the
    /// same arguments is already deployed on this network.
    ///
    /// A record is only written once the creation transaction was mined
    /// successfully.
    pub async fn deploy(
        &self,
        contract_name: &str,
        deployer: Address,
        args: &[DynSolValue],
    ) -> Result<Deployment, DeploymentError> {
        let artifact = self.artifacts.artifact(contract_name).await.map_err(|source| {
            DeploymentError::UnknownArtifact {
                contract_name: contract_name.to_owned(),
                source,
            }
        })?;
        let encoded_args =
            artifact
                .encode_args(args)
                .map_err(|source| DeploymentError::ArgumentMismatch {
                    contract_name: contract_name.to_owned(),
                    source,
                })?;
        if !self.chain.signers().contains(&deployer) {
            return Err(DeploymentError::UnknownDeployer(deployer));
        }
        let chain_id = self.chain.chain_id().await.map_err(DeploymentError::Chain)?;
        let bytecode_hash = artifact.bytecode_hash();

        let previous = match self.store.get(self.profile.network, contract_name).await? {
            Some(record) if record.chain_id != chain_id => {
                tracing::warn!(
                    contract_name,
                    recorded = record.chain_id,
                    connected = chain_id,
                    "ignoring deployment recorded for another chain"
                );
                None
            }
            previous => previous,
        };
        if let Some(record) = &previous
            && record.bytecode_hash == bytecode_hash
            && record.args == encoded_args
            && !self
                .chain
                .code_at(record.address)
                .await
                .map_err(DeploymentError::Chain)?
                .is_empty()
        {
            tracing::info!("reusing \"{contract_name}\" at {}", record.address);
            return Ok(Deployment {
                record: record.clone(),
                outcome: Outcome::Reused,
            });
        }

        let balance = self.chain.balance(deployer).await.map_err(DeploymentError::Chain)?;
        if balance.is_zero() {
            return Err(DeploymentError::Unfunded(deployer));
        }

        let receipt = self
            .chain
            .deploy(deployer, artifact.init_code(&encoded_args))
            .await
            .map_err(|err| match err {
                ethrpc::Error::Revert { reason } => DeploymentError::Reverted {
                    transaction_hash: None,
                    reason,
                },
                ethrpc::Error::InsufficientFunds(_) => DeploymentError::Unfunded(deployer),
                ethrpc::Error::UnknownSigner(account) => DeploymentError::UnknownDeployer(account),
                err => DeploymentError::Rejected(err),
            })?;
        let address = match (receipt.success, receipt.contract_address) {
            (true, Some(address)) => address,
            _ => {
                return Err(DeploymentError::Reverted {
                    transaction_hash: Some(receipt.transaction_hash),
                    reason: None,
                });
            }
        };

        let record = DeploymentRecord {
            contract_name: contract_name.to_owned(),
            address,
            abi: artifact.abi,
            network: self.profile.network,
            chain_id,
            transaction_hash: receipt.transaction_hash,
            deployer,
            args: encoded_args,
            bytecode_hash,
            num_deployments: previous.map_or(1, |record| record.num_deployments + 1),
        };
        self.store.put(&record).await?;
        tracing::info!(
            "deploying \"{contract_name}\" (tx: {})...: deployed at {} with {} gas",
            receipt.transaction_hash,
            address,
            receipt.gas_used
        );
        Ok(Deployment {
            record,
            outcome: Outcome::Deployed,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{Bytes, U256},
        contracts::{Artifacts, MockArtifactSource, polygon_dao::CONTRACT_NAME},
        ethrpc::MockChain,
        network::Network,
        testlib::{FakeChain, artifacts},
    };

    struct Setup {
        chain: Arc<FakeChain>,
        store: Arc<InMemoryStore>,
        deployer: Address,
    }

    impl Setup {
        fn new() -> Self {
            let chain = Arc::new(FakeChain::new(&testlib::dev_profile(Network::Hardhat)));
            let deployer = chain.signers()[0];
            Self {
                chain,
                store: Default::default(),
                deployer,
            }
        }

        fn deployer(&self, artifacts: Artifacts) -> Deployer {
            Deployer::new(
                testlib::dev_profile(Network::Hardhat),
                self.chain.clone(),
                Arc::new(artifacts),
                self.store.clone(),
            )
        }
    }

    #[tokio::test]
    async fn deploys_and_records() {
        observe::tracing::initialize_reentrant("deployments=debug");
        let setup = Setup::new();
        let deployment = setup
            .deployer(artifacts::with_polygon_dao())
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await
            .unwrap();

        assert_eq!(deployment.outcome, Outcome::Deployed);
        let record = &deployment.record;
        assert_eq!(record.contract_name, CONTRACT_NAME);
        assert_eq!(record.address, setup.deployer.create(0));
        assert_eq!(record.network, Network::Hardhat);
        assert_eq!(record.chain_id, network::DEV_CHAIN_ID);
        assert_eq!(record.deployer, setup.deployer);
        assert_eq!(record.args, Bytes::new());
        assert_eq!(record.bytecode_hash, artifacts::polygon_dao().bytecode_hash());
        assert_eq!(record.num_deployments, 1);
        assert_eq!(record.abi, artifacts::polygon_dao().abi);

        assert_eq!(
            setup
                .store
                .get(Network::Hardhat, CONTRACT_NAME)
                .await
                .unwrap()
                .as_ref(),
            Some(record)
        );
    }

    #[tokio::test]
    async fn reuses_identical_deployment() {
        let setup = Setup::new();
        let deployer = setup.deployer(artifacts::with_polygon_dao());
        let first = deployer.deploy(CONTRACT_NAME, setup.deployer, &[]).await.unwrap();
        let second = deployer.deploy(CONTRACT_NAME, setup.deployer, &[]).await.unwrap();

        assert_eq!(second.outcome, Outcome::Reused);
        assert_eq!(second.record, first.record);
        assert_eq!(setup.chain.transactions().len(), 1);
    }

    #[tokio::test]
    async fn redeploys_changed_bytecode() {
        let setup = Setup::new();
        let first = setup
            .deployer(artifacts::with_polygon_dao())
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await
            .unwrap();

        let recompiled = Artifacts::default().with(artifacts::polygon_dao_with_bytecode(
            Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52, 0x02]),
        ));
        let second = setup
            .deployer(recompiled)
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await
            .unwrap();

        assert_eq!(second.outcome, Outcome::Deployed);
        assert_eq!(second.record.num_deployments, 2);
        assert_ne!(second.record.address, first.record.address);
        assert_eq!(
            setup.store.get(Network::Hardhat, CONTRACT_NAME).await.unwrap(),
            Some(second.record)
        );
    }

    #[tokio::test]
    async fn redeploys_when_code_is_gone() {
        let setup = Setup::new();
        let deployer = setup.deployer(artifacts::with_polygon_dao());
        let first = deployer.deploy(CONTRACT_NAME, setup.deployer, &[]).await.unwrap();
        setup.chain.wipe(first.record.address);

        let second = deployer.deploy(CONTRACT_NAME, setup.deployer, &[]).await.unwrap();
        assert_eq!(second.outcome, Outcome::Deployed);
        assert_eq!(second.record.num_deployments, 2);
    }

    #[tokio::test]
    async fn ignores_records_of_other_chains() {
        let setup = Setup::new();
        let first = setup
            .deployer(artifacts::with_polygon_dao())
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await
            .unwrap();
        setup
            .store
            .put(&DeploymentRecord {
                chain_id: 1,
                ..first.record.clone()
            })
            .await
            .unwrap();

        let second = setup
            .deployer(artifacts::with_polygon_dao())
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await
            .unwrap();
        assert_eq!(second.outcome, Outcome::Deployed);
        assert_eq!(second.record.chain_id, network::DEV_CHAIN_ID);
        assert_eq!(second.record.num_deployments, 1);
    }

    #[tokio::test]
    async fn unknown_artifact() {
        let setup = Setup::new();
        let result = setup
            .deployer(Artifacts::default())
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await;
        assert!(matches!(
            result,
            Err(DeploymentError::UnknownArtifact {
                source: ArtifactError::NotFound(_),
                ..
            })
        ));
        assert!(setup.chain.transactions().is_empty());
    }

    #[tokio::test]
    async fn argument_mismatch() {
        let setup = Setup::new();
        let result = setup
            .deployer(artifacts::with_polygon_dao())
            .deploy(CONTRACT_NAME, setup.deployer, &[DynSolValue::Bool(true)])
            .await;
        assert!(matches!(
            result,
            Err(DeploymentError::ArgumentMismatch {
                source: ArgumentError::Arity {
                    expected: 0,
                    given: 1
                },
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unknown_and_unfunded_deployers() {
        let setup = Setup::new();
        let deployer = setup.deployer(artifacts::with_polygon_dao());

        let stranger = Address::repeat_byte(0xaa);
        assert!(matches!(
            deployer.deploy(CONTRACT_NAME, stranger, &[]).await,
            Err(DeploymentError::UnknownDeployer(account)) if account == stranger
        ));

        setup.chain.set_balance(setup.deployer, U256::ZERO);
        assert!(matches!(
            deployer.deploy(CONTRACT_NAME, setup.deployer, &[]).await,
            Err(DeploymentError::Unfunded(account)) if account == setup.deployer
        ));

        assert!(setup.chain.transactions().is_empty());
        assert_eq!(
            setup.store.get(Network::Hardhat, CONTRACT_NAME).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn failed_deployment_writes_nothing() {
        let setup = Setup::new();
        setup.chain.revert_deployments();
        let result = setup
            .deployer(artifacts::with_polygon_dao())
            .deploy(CONTRACT_NAME, setup.deployer, &[])
            .await;

        assert!(matches!(
            result,
            Err(DeploymentError::Reverted {
                transaction_hash: Some(_),
                ..
            })
        ));
        assert_eq!(
            setup.store.get(Network::Hardhat, CONTRACT_NAME).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn node_rejection() {
        let deployer_account = Address::repeat_byte(1);
        let mut chain = MockChain::new();
        chain
            .expect_signers()
            .returning(move || vec![deployer_account]);
        chain.expect_chain_id().returning(|| Ok(network::DEV_CHAIN_ID));
        chain
            .expect_balance()
            .returning(|_| Ok(U256::from(1_000_000_000_u64)));
        chain
            .expect_deploy()
            .times(1)
            .returning(|_, _| Err(ethrpc::Error::Node("nonce too low".into())));

        let mut store = MockDeploymentStore::new();
        store.expect_get().returning(|_, _| Ok(None));
        store.expect_put().never();

        let deployer = Deployer::new(
            testlib::dev_profile(Network::Localhost),
            Arc::new(chain),
            Arc::new(artifacts::with_polygon_dao()),
            Arc::new(store),
        );
        assert!(matches!(
            deployer.deploy(CONTRACT_NAME, deployer_account, &[]).await,
            Err(DeploymentError::Rejected(ethrpc::Error::Node(_)))
        ));
    }

    #[tokio::test]
    async fn artifact_errors_are_not_retried() {
        let mut artifacts = MockArtifactSource::new();
        artifacts
            .expect_artifact()
            .times(1)
            .returning(|name| Err(ArtifactError::EmptyBytecode(name.to_owned())));
        let mut chain = MockChain::new();
        chain.expect_deploy().never();

        let deployer = Deployer::new(
            testlib::dev_profile(Network::Hardhat),
            Arc::new(chain),
            Arc::new(artifacts),
            Arc::new(InMemoryStore::default()),
        );
        assert!(matches!(
            deployer.deploy(CONTRACT_NAME, Address::ZERO, &[]).await,
            Err(DeploymentError::UnknownArtifact {
                source: ArtifactError::EmptyBytecode(_),
                ..
            })
        ));
    }
}
