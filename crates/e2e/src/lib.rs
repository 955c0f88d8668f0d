//! Helpers for running the deployment and the membership scenario against a
//! real development node. Tests using them need `anvil` on the `PATH` and are
//! ignored by default.

use {
    anyhow::{Context, Result},
    contracts::{ArtifactDir, ArtifactSource, polygon_dao::CONTRACT_NAME},
    ethrpc::{RpcChain, node::EphemeralNode},
    futures::FutureExt,
    network::{Configuration, Environment, Network, NetworkProfile},
    std::{
        future::Future,
        io::Write,
        panic::{self, AssertUnwindSafe},
        path::{Path, PathBuf},
        sync::Arc,
    },
    tempfile::{TempDir, TempPath},
};

/// Init code of a contract without any logic. Its runtime code is a single
/// `STOP`, so every call to it succeeds.
const NOOP_INIT_CODE: &str = "0x600060005360016000f3";

/// Create a temporary file with the given content.
pub fn config_tmp_file<C: AsRef<[u8]>>(content: C) -> TempPath {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_ref()).unwrap();
    file.into_temp_path()
}

/// Hardhat artifact with the DAO's interface and no-op code.
pub fn noop_polygon_dao() -> serde_json::Value {
    serde_json::json!({
        "_format": "hh-sol-artifact-1",
        "contractName": CONTRACT_NAME,
        "sourceName": format!("contracts/{CONTRACT_NAME}.sol"),
        "abi": [
            {
                "type": "function",
                "name": "applyForMembership",
                "inputs": [],
                "outputs": [],
                "stateMutability": "nonpayable"
            },
            {
                "type": "function",
                "name": "approveMembership",
                "inputs": [{ "name": "member", "type": "address", "internalType": "address" }],
                "outputs": [],
                "stateMutability": "nonpayable"
            }
        ],
        "bytecode": NOOP_INIT_CODE,
        "deployedBytecode": "0x00",
        "linkReferences": {},
        "deployedLinkReferences": {}
    })
}

/// Everything a test needs: a fresh node, a `localhost` profile pointing at
/// it and empty directories for artifacts and deployment records.
pub struct Setup {
    pub node: EphemeralNode,
    pub profile: NetworkProfile,
    pub chain: Arc<RpcChain>,
    pub artifacts_dir: PathBuf,
    pub deployments: TempDir,
    _artifacts: Option<TempDir>,
}

impl Setup {
    pub async fn new() -> Result<Self> {
        let node = EphemeralNode::spawn().context("spawning anvil")?;
        let config = Configuration::from_toml(&localhost_config(&node))?;
        let profile = NetworkProfile::resolve(Network::Localhost, &Environment::default(), &config)?;
        let chain = Arc::new(RpcChain::connect(&profile).await?);

        // Compiled artifacts are used if provided, the no-op stand-in
        // otherwise.
        let (artifacts_dir, artifacts) = match std::env::var("ARTIFACTS_DIR") {
            Ok(dir) => (PathBuf::from(dir), None),
            Err(_) => {
                let dir = tempfile::tempdir()?;
                std::fs::write(
                    dir.path().join(format!("{CONTRACT_NAME}.json")),
                    serde_json::to_vec_pretty(&noop_polygon_dao())?,
                )?;
                (dir.path().to_owned(), Some(dir))
            }
        };

        Ok(Self {
            node,
            profile,
            chain,
            artifacts_dir,
            deployments: tempfile::tempdir()?,
            _artifacts: artifacts,
        })
    }

    pub fn artifacts(&self) -> Arc<dyn ArtifactSource> {
        Arc::new(ArtifactDir::new(&self.artifacts_dir))
    }

    pub fn deployments_dir(&self) -> &Path {
        self.deployments.path()
    }

    /// Configuration file pointing the `localhost` network at this node.
    pub fn config_file(&self) -> TempPath {
        config_tmp_file(localhost_config(&self.node))
    }
}

fn localhost_config(node: &EphemeralNode) -> String {
    format!("[networks.localhost]\nurl = \"{}\"\n", node.endpoint())
}

/// Runs `f` against a freshly started node. Initializes tracing and makes
/// sure panics inside the test still tear the node down.
pub async fn run_test<F, Fut>(f: F)
where
    F: FnOnce(Setup) -> Fut,
    Fut: Future<Output = ()>,
{
    let filters = [
        "warn",
        "deployments=debug",
        "e2e=debug",
        "ethrpc=debug",
        "membership=debug",
        "network=debug",
    ]
    .join(",");
    observe::tracing::initialize_reentrant(&filters);

    let setup = Setup::new().await.expect("test setup");
    let result = AssertUnwindSafe(f(setup)).catch_unwind().await;
    if let Err(err) = result {
        panic::resume_unwind(err);
    }
}
