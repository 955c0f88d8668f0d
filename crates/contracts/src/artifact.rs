use {
    alloy::{
        dyn_abi::{DynSolValue, JsonAbiExt},
        json_abi::JsonAbi,
        primitives::{B256, Bytes, keccak256},
    },
    serde::Deserialize,
    std::{
        collections::HashMap,
        io,
        path::{Path, PathBuf},
    },
    thiserror::Error,
};

/// Compiled contract as emitted by Hardhat.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub contract_name: String,
    pub abi: JsonAbi,
    /// Creation bytecode.
    pub bytecode: Bytes,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("constructor takes {expected} arguments but {given} were given")]
    Arity { expected: usize, given: usize },
    #[error("constructor arguments don't match the ABI: {0}")]
    Encoding(String),
}

impl Artifact {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// ABI encodes `args` for the constructor.
    pub fn encode_args(&self, args: &[DynSolValue]) -> Result<Bytes, ArgumentError> {
        let Some(constructor) = &self.abi.constructor else {
            return match args.len() {
                0 => Ok(Bytes::new()),
                given => Err(ArgumentError::Arity { expected: 0, given }),
            };
        };
        if constructor.inputs.len() != args.len() {
            return Err(ArgumentError::Arity {
                expected: constructor.inputs.len(),
                given: args.len(),
            });
        }
        constructor
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|err| ArgumentError::Encoding(err.to_string()))
    }

    /// Creation bytecode followed by the encoded constructor arguments.
    pub fn init_code(&self, encoded_args: &[u8]) -> Bytes {
        [&self.bytecode[..], encoded_args].concat().into()
    }

    pub fn bytecode_hash(&self) -> B256 {
        keccak256(&self.bytecode)
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("no artifact for contract {0:?}")]
    NotFound(String),
    #[error("failed to read artifact {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed artifact {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact {} contains contract {found:?}", path.display())]
    NameMismatch { path: PathBuf, found: String },
    #[error("artifact for contract {0:?} has no bytecode")]
    EmptyBytecode(String),
}

/// Where compiled contracts come from.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn artifact(&self, contract_name: &str) -> Result<Artifact, ArtifactError>;
}

/// Hardhat artifacts directory. Both the nested compiler output layout
/// `<root>/contracts/<Name>.sol/<Name>.json` and a flat `<root>/<Name>.json`
/// are understood, in that order.
#[derive(Clone, Debug)]
pub struct ArtifactDir {
    root: PathBuf,
}

impl ArtifactDir {
    pub const DEFAULT: &'static str = "artifacts";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn candidates(&self, contract_name: &str) -> [PathBuf; 2] {
        let file = format!("{contract_name}.json");
        [
            self.root
                .join("contracts")
                .join(format!("{contract_name}.sol"))
                .join(&file),
            self.root.join(file),
        ]
    }
}

#[async_trait::async_trait]
impl ArtifactSource for ArtifactDir {
    async fn artifact(&self, contract_name: &str) -> Result<Artifact, ArtifactError> {
        for path in self.candidates(contract_name) {
            let json = match tokio::fs::read_to_string(&path).await {
                Ok(json) => json,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ArtifactError::Read { path, source }),
            };
            let artifact = Artifact::from_json(&json)
                .map_err(|source| ArtifactError::Parse {
                    path: path.clone(),
                    source,
                })?;
            if artifact.contract_name != contract_name {
                return Err(ArtifactError::NameMismatch {
                    path,
                    found: artifact.contract_name,
                });
            }
            if artifact.bytecode.is_empty() {
                // Interfaces and abstract contracts compile to empty bytecode.
                return Err(ArtifactError::EmptyBytecode(artifact.contract_name));
            }
            tracing::debug!(contract_name, path = %path.display(), "loaded artifact");
            return Ok(artifact);
        }
        Err(ArtifactError::NotFound(contract_name.to_owned()))
    }
}

/// Artifacts held in memory, keyed by contract name.
#[derive(Clone, Debug, Default)]
pub struct Artifacts(HashMap<String, Artifact>);

impl Artifacts {
    pub fn with(mut self, artifact: Artifact) -> Self {
        self.0.insert(artifact.contract_name.clone(), artifact);
        self
    }
}

#[async_trait::async_trait]
impl ArtifactSource for Artifacts {
    async fn artifact(&self, contract_name: &str) -> Result<Artifact, ArtifactError> {
        self.0
            .get(contract_name)
            .cloned()
            .ok_or_else(|| ArtifactError::NotFound(contract_name.to_owned()))
    }
}
