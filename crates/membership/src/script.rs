//! The membership scenario: two accounts apply for membership of the DAO
//! and the default account, which administers it, approves the second one.

use {
    crate::contract::{self, ContractCallError, ContractHandle, LookupError},
    alloy::primitives::Address,
    contracts::polygon_dao::{self, CONTRACT_NAME},
    deployments::DeploymentStore,
    ethrpc::Chain,
    network::NetworkProfile,
    std::{fmt, sync::Arc},
    thiserror::Error,
};

/// Progress of a [`Scenario`]. Each stage is entered only after every call of
/// the previous one was mined successfully.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Lookup,
    SignersReady,
    Applied,
    Approved,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lookup => "lookup",
            Self::SignersReady => "signers ready",
            Self::Applied => "applied",
            Self::Approved => "approved",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("the scenario needs {required} signers but the network provides {available}")]
    NotEnoughSigners { required: usize, available: usize },
    #[error(transparent)]
    Call(#[from] ContractCallError),
}

/// Terminal error state of a [`Scenario`].
#[derive(Debug, Error)]
#[error("membership scenario failed at stage {stage}")]
pub struct Failed {
    /// Last stage that was reached.
    pub stage: Stage,
    #[source]
    pub source: ScriptError,
}

/// Accounts and contract involved in a completed scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    pub dao: Address,
    pub admin: Address,
    pub member: Address,
}

/// Fails like the lookup stage of a [`Scenario`] if the DAO has no record on
/// the active network. Only reads the store.
pub async fn ensure_deployed(
    profile: &NetworkProfile,
    store: &dyn DeploymentStore,
) -> Result<(), Failed> {
    match contract::find(CONTRACT_NAME, profile, store).await {
        Ok(_) => Ok(()),
        Err(err) => Err(Failed {
            stage: Stage::Lookup,
            source: err.into(),
        }),
    }
}

pub struct Scenario<'a> {
    profile: &'a NetworkProfile,
    store: &'a dyn DeploymentStore,
    chain: Arc<dyn Chain>,
    member_index: usize,
    stage: Stage,
}

impl<'a> Scenario<'a> {
    pub fn new(
        profile: &'a NetworkProfile,
        store: &'a dyn DeploymentStore,
        chain: Arc<dyn Chain>,
        member_index: usize,
    ) -> Self {
        Self {
            profile,
            store,
            chain,
            member_index,
            stage: Stage::Lookup,
        }
    }

    /// Runs the scenario to completion, stopping at the first failure.
    pub async fn run(mut self) -> Result<Report, Failed> {
        match self.execute().await {
            Ok(report) => Ok(report),
            Err(source) => Err(Failed {
                stage: self.stage,
                source,
            }),
        }
    }

    async fn execute(&mut self) -> Result<Report, ScriptError> {
        let dao =
            ContractHandle::lookup(CONTRACT_NAME, self.profile, self.store, self.chain.clone())
                .await?;

        let signers = self.chain.signers();
        let required = self.member_index.max(1) + 1;
        let (admin, member) = match (signers.first(), signers.get(self.member_index)) {
            (Some(admin), Some(member)) if self.member_index > 0 => (*admin, *member),
            _ => {
                return Err(ScriptError::NotEnoughSigners {
                    required,
                    available: signers.len(),
                });
            }
        };
        self.advance(Stage::SignersReady);

        dao.transact(
            "applyForMembership",
            admin,
            polygon_dao::apply_for_membership(),
        )
        .await?;
        dao.transact(
            "applyForMembership",
            member,
            polygon_dao::apply_for_membership(),
        )
        .await?;
        self.advance(Stage::Applied);

        dao.transact(
            "approveMembership",
            admin,
            polygon_dao::approve_membership(member),
        )
        .await?;
        self.advance(Stage::Approved);

        tracing::info!("{member} approved as a member");
        self.advance(Stage::Done);
        Ok(Report {
            dao: dao.address(),
            admin,
            member,
        })
    }

    fn advance(&mut self, stage: Stage) {
        tracing::debug!(from = %self.stage, to = %stage, "scenario progressed");
        self.stage = stage;
    }
}
