use {
    clap::{Parser, Subcommand},
    network::{Environment, Network},
    std::{
        fmt::{self, Display, Formatter},
        num::NonZeroUsize,
        path::PathBuf,
    },
    tracing::Level,
};

/// Deploy the PolygonDAO contract and run the membership scenario against it
#[derive(Parser, Debug)]
#[command(name = "polygon-dao", version)]
pub struct Arguments {
    /// Network to run against: hardhat, localhost or polygon_mumbai.
    #[clap(long, env = "NETWORK", default_value = "hardhat")]
    pub network: Network,

    /// Optional TOML file overriding network endpoints and named accounts.
    #[clap(long, env = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory with the compiled Hardhat artifacts.
    #[clap(long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Directory the deployment records of persistent networks are kept in.
    #[clap(long, env = "DEPLOYMENTS_DIR", default_value = "deployments")]
    pub deployments: PathBuf,

    /// Endpoint of the remote network.
    #[clap(long, env = "RPC_URL", hide_env_values = true)]
    pub rpc_url: Option<String>,

    /// Key signing transactions on the remote network.
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    #[clap(
        long,
        env = "LOG_FILTER",
        default_value = "warn,membership=info,deployments=info,ethrpc=info,network=info"
    )]
    pub log_filter: String,

    /// Log events at this level or more severe go to stderr.
    #[clap(long, env = "LOG_STDERR_THRESHOLD", default_value = "error")]
    pub log_stderr_threshold: Level,

    #[clap(long, env = "USE_JSON_LOGS", default_value = "false")]
    pub use_json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Deploy the contract unless an identical deployment exists.
    Deploy,
    /// Apply for membership with two accounts and approve the second one.
    Interact(Interaction),
    /// Deploy, then interact, in a single process.
    Run(Interaction),
}

#[derive(clap::Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    /// Index of the signer that applies and gets approved. The default signer
    /// (index 0) administers the DAO.
    #[clap(long, default_value = "1")]
    pub member_index: NonZeroUsize,
}

impl Arguments {
    pub fn environment(&self) -> Environment {
        Environment {
            rpc_url: self.rpc_url.clone(),
            private_key: self.private_key.clone(),
        }
    }

    pub fn observe(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold,
            self.use_json_logs,
        )
    }
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

fn display_secret_option<T>(f: &mut Formatter<'_>, name: &str, option: &Option<T>) -> fmt::Result {
    display_option(f, name, &option.as_ref().map(|_| "SECRET"))
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            network,
            config,
            artifacts,
            deployments,
            rpc_url,
            private_key,
            log_filter,
            log_stderr_threshold,
            use_json_logs,
            command,
        } = self;

        writeln!(f, "network: {network}")?;
        display_option(f, "config", &config.as_ref().map(|path| path.display()))?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "deployments: {}", deployments.display())?;
        // Provider URLs commonly embed an API key.
        display_secret_option(f, "rpc_url", rpc_url)?;
        display_secret_option(f, "private_key", private_key)?;
        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        writeln!(f, "command: {command:?}")?;
        Ok(())
    }
}
