//! The `polygon-dao` command line tool: deploys the PolygonDAO contract to
//! the selected network and runs the membership scenario against it.

pub mod arguments;
pub mod contract;
mod error;
pub mod script;

pub use {
    error::Error,
    script::{Failed, Report, Scenario, Stage},
};
use {
    arguments::{Arguments, Command},
    clap::Parser,
    contracts::{ArtifactDir, ArtifactSource, polygon_dao::CONTRACT_NAME},
    deployments::{Deployer, Deployment, DeploymentStore},
    ethrpc::{Chain, RpcChain},
    network::{Configuration, ConfigurationError, NamedAccounts, NetworkProfile},
    std::{process::ExitCode, sync::Arc},
};

/// Entry point of the binary. Returns the process exit code.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    // Has to happen before the arguments are parsed so values from `.env`
    // act as environment variables.
    let dotenv = dotenvy::dotenv();
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.observe());
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
        Err(err) if err.not_found() => (),
        Err(err) => tracing::warn!(?err, "failed to load .env file"),
    }
    tracing::info!("running polygon-dao with validated arguments:\n{}", args);

    exit_code(&run(args).await)
}

/// Maps the outcome of [`run`] to the process exit code, logging failures.
pub fn exit_code(result: &Result<(), Error>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(?err, "{}", error_chain(err));
            ExitCode::FAILURE
        }
    }
}

pub async fn run(args: Arguments) -> Result<(), Error> {
    let config = match &args.config {
        Some(path) => Configuration::from_path(path).await?,
        None => Configuration::default(),
    };
    let profile = NetworkProfile::resolve(args.network, &args.environment(), &config)?;
    let store = deployments::store_for(&profile, &args.deployments);
    // A missing deployment is reported without touching the chain.
    if let Command::Interact(_) = args.command {
        script::ensure_deployed(&profile, store.as_ref()).await?;
    }
    let chain: Arc<dyn Chain> = Arc::new(RpcChain::connect(&profile).await?);
    let artifacts: Arc<dyn ArtifactSource> = Arc::new(ArtifactDir::new(&args.artifacts));

    match args.command {
        Command::Deploy => {
            let deployer = Deployer::new(profile.clone(), chain.clone(), artifacts, store);
            deploy(&profile, &config.named_accounts(), &deployer, chain.as_ref()).await?;
        }
        Command::Interact(interaction) => {
            interact(&profile, store.as_ref(), chain, interaction.member_index.get()).await?;
        }
        Command::Run(interaction) => {
            let deployer = Deployer::new(profile.clone(), chain.clone(), artifacts, store.clone());
            deploy(&profile, &config.named_accounts(), &deployer, chain.as_ref()).await?;
            interact(&profile, store.as_ref(), chain, interaction.member_index.get()).await?;
        }
    }
    Ok(())
}

/// Deploys the DAO from the `deployer` named account.
pub async fn deploy(
    profile: &NetworkProfile,
    named_accounts: &NamedAccounts,
    deployer: &Deployer,
    chain: &dyn Chain,
) -> Result<Deployment, Error> {
    tracing::info!(network = %profile.network, "deploying");
    let index = named_accounts.resolve(NamedAccounts::DEPLOYER, profile)?;
    let signers = chain.signers();
    let account = signers
        .get(index)
        .copied()
        .ok_or_else(|| ConfigurationError::AccountIndexOutOfRange {
            role: NamedAccounts::DEPLOYER.to_owned(),
            index,
            network: profile.network,
            available: signers.len(),
        })?;
    Ok(deployer.deploy(CONTRACT_NAME, account, &[]).await?)
}

pub async fn interact(
    profile: &NetworkProfile,
    store: &dyn DeploymentStore,
    chain: Arc<dyn Chain>,
    member_index: usize,
) -> Result<Report, Error> {
    Ok(Scenario::new(profile, store, chain, member_index).run().await?)
}

/// Formats an error followed by all of its causes.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        contract::LookupError,
        deployments::{InMemoryStore, Outcome},
        network::{NamedAccount, Network},
        script::ScriptError,
        testlib::{FakeChain, artifacts},
    };

    fn arguments(args: &[&str]) -> Arguments {
        Arguments::try_parse_from(std::iter::once("polygon-dao").chain(args.iter().copied()))
            .unwrap()
    }

    fn not_deployed(result: &Result<(), Error>) -> bool {
        matches!(
            result,
            Err(Error::Script(Failed {
                stage: Stage::Lookup,
                source: ScriptError::Lookup(LookupError::NotDeployed { .. }),
            }))
        )
    }

    #[tokio::test]
    async fn interact_without_deployment_never_connects() {
        let dir = tempfile::tempdir().unwrap();
        // Nothing listens on this port, so connecting would fail differently.
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[networks.localhost]\nurl = \"http://127.0.0.1:1\"\n").unwrap();
        let deployments = dir.path().join("deployments");

        let result = run(arguments(&[
            "--network",
            "localhost",
            "--config",
            config.to_str().unwrap(),
            "--deployments",
            deployments.to_str().unwrap(),
            "interact",
        ]))
        .await;
        assert!(not_deployed(&result), "{result:?}");
        assert_eq!(exit_code(&result), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn interact_on_ephemeral_network_needs_run() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(arguments(&[
            "--network",
            "hardhat",
            "--deployments",
            dir.path().to_str().unwrap(),
            "interact",
        ]))
        .await;
        assert!(not_deployed(&result), "{result:?}");
    }

    #[tokio::test]
    async fn invalid_configuration_exits_with_failure() {
        let result = run(arguments(&[
            "--network",
            "polygon_mumbai",
            "--rpc-url=",
            "--private-key",
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
            "deploy",
        ]))
        .await;
        assert!(matches!(
            result,
            Err(Error::Configuration(ConfigurationError::MissingRpcEndpoint(
                Network::PolygonMumbai
            )))
        ));
        assert_eq!(exit_code(&result), ExitCode::FAILURE);
    }

    #[test]
    fn completed_run_exits_with_success() {
        assert_eq!(exit_code(&Ok(())), ExitCode::SUCCESS);
    }

    #[tokio::test]
    async fn deploy_then_interact() {
        let profile = testlib::dev_profile(Network::Hardhat);
        let chain = Arc::new(FakeChain::new(&profile));
        let store: Arc<dyn DeploymentStore> = Arc::new(InMemoryStore::default());
        let deployer = Deployer::new(
            profile.clone(),
            chain.clone(),
            Arc::new(artifacts::with_polygon_dao()),
            store.clone(),
        );

        let deployment = deploy(&profile, &NamedAccounts::default(), &deployer, chain.as_ref())
            .await
            .unwrap();
        assert_eq!(deployment.outcome, Outcome::Deployed);
        assert_eq!(deployment.record.deployer, chain.signers()[0]);

        let report = interact(&profile, store.as_ref(), chain.clone(), 1)
            .await
            .unwrap();
        assert_eq!(report.dao, deployment.record.address);

        // Deploying again reuses the contract.
        let again = deploy(&profile, &NamedAccounts::default(), &deployer, chain.as_ref())
            .await
            .unwrap();
        assert_eq!(again.outcome, Outcome::Reused);
    }

    #[tokio::test]
    async fn deployer_from_named_accounts() {
        let profile = testlib::dev_profile(Network::Localhost);
        let chain = Arc::new(FakeChain::new(&profile));
        let deployer = Deployer::new(
            profile.clone(),
            chain.clone(),
            Arc::new(artifacts::with_polygon_dao()),
            Arc::new(InMemoryStore::default()),
        );
        let mut account = NamedAccount::new(0);
        account.networks.insert("localhost".into(), 3);
        let named_accounts = NamedAccounts::default().with(NamedAccounts::DEPLOYER, account);

        let deployment = deploy(&profile, &named_accounts, &deployer, chain.as_ref())
            .await
            .unwrap();
        assert_eq!(deployment.record.deployer, chain.signers()[3]);

        let out_of_range =
            NamedAccounts::default().with(NamedAccounts::DEPLOYER, NamedAccount::new(10));
        assert!(matches!(
            deploy(&profile, &out_of_range, &deployer, chain.as_ref()).await,
            Err(Error::Configuration(
                ConfigurationError::AccountIndexOutOfRange { index: 10, .. }
            ))
        ));
    }

    #[test]
    fn error_chain_includes_causes() {
        let err = Error::Configuration(ConfigurationError::MissingCredential(
            Network::PolygonMumbai,
        ));
        assert_eq!(
            error_chain(&err),
            "invalid configuration: network polygon_mumbai requires a signing key, set \
             PRIVATE_KEY"
        );
    }
}
