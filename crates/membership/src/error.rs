use {
    crate::script::Failed,
    deployments::DeploymentError,
    ethrpc::ConnectError,
    network::ConfigurationError,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration")]
    Configuration(#[from] ConfigurationError),
    #[error("failed to connect to the network")]
    Connect(#[from] ConnectError),
    #[error("deployment failed")]
    Deployment(#[from] DeploymentError),
    #[error(transparent)]
    Script(#[from] Failed),
}
