//! In-memory chain that executes deployments and the DAO membership calls.
//!
//! Every contract deployed on a [`FakeChain`] behaves like the PolygonDAO:
//! the deploying account becomes the administrator, any account may apply
//! once and only the administrator approves applicants.

use {
    alloy::primitives::{Address, B256, Bytes, U256, keccak256},
    contracts::polygon_dao::Call,
    ethrpc::{Chain, Error, Receipt, wallet::Wallet},
    network::{DEV_CHAIN_ID, NetworkProfile},
    std::{
        collections::{BTreeSet, HashMap},
        sync::Mutex,
    },
};

const DEPLOY_GAS: u64 = 53_000;
const CALL_GAS: u64 = 45_000;

/// Membership state of a deployed DAO.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Membership {
    pub admin: Address,
    pub applicants: BTreeSet<Address>,
    pub members: BTreeSet<Address>,
}

#[derive(Default)]
struct State {
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    code: HashMap<Address, Bytes>,
    daos: HashMap<Address, Membership>,
    transactions: Vec<(Address, Option<Call>)>,
    revert_deployments: bool,
}

pub struct FakeChain {
    chain_id: u64,
    signers: Vec<Address>,
    state: Mutex<State>,
}

impl FakeChain {
    /// Chain with the profile's accounts as funded signers.
    pub fn new(profile: &NetworkProfile) -> Self {
        let wallet = Wallet::from_credentials(&profile.accounts).expect("valid test credentials");
        Self::with_signers(profile.chain_id.unwrap_or(DEV_CHAIN_ID), wallet.accounts)
    }

    pub fn with_signers(chain_id: u64, signers: Vec<Address>) -> Self {
        let state = State {
            balances: signers
                .iter()
                .map(|signer| (*signer, U256::from(10_000) * U256::from(10).pow(U256::from(18))))
                .collect(),
            ..Default::default()
        };
        Self {
            chain_id,
            signers,
            state: Mutex::new(state),
        }
    }

    pub fn set_balance(&self, account: Address, balance: U256) {
        self.state().balances.insert(account, balance);
    }

    /// Makes every following deployment get mined with a failed status.
    pub fn revert_deployments(&self) {
        self.state().revert_deployments = true;
    }

    /// Removes the code at `address` as if the chain had been reset.
    pub fn wipe(&self, address: Address) {
        let mut state = self.state();
        state.code.remove(&address);
        state.daos.remove(&address);
    }

    pub fn membership(&self, dao: Address) -> Option<Membership> {
        self.state().daos.get(&dao).cloned()
    }

    /// Senders and decoded calls of every transaction submitted so far,
    /// including failed ones. Deployments show up without a call.
    pub fn transactions(&self) -> Vec<(Address, Option<Call>)> {
        self.state().transactions.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn check_sender(&self, state: &State, from: Address) -> Result<(), Error> {
        if !self.signers.contains(&from) {
            return Err(Error::UnknownSigner(from));
        }
        if state.balances.get(&from).copied().unwrap_or_default().is_zero() {
            return Err(Error::InsufficientFunds(format!(
                "insufficient funds for gas * price + value: address {from} have 0"
            )));
        }
        Ok(())
    }
}

impl State {
    fn next_nonce(&mut self, from: Address) -> u64 {
        let nonce = self.nonces.entry(from).or_default();
        let current = *nonce;
        *nonce += 1;
        current
    }
}

fn transaction_hash(from: Address, nonce: u64) -> B256 {
    keccak256([from.as_slice(), &nonce.to_be_bytes()].concat())
}

fn revert(reason: &str) -> Error {
    Error::Revert {
        reason: Some(reason.to_owned()),
    }
}

#[async_trait::async_trait]
impl Chain for FakeChain {
    async fn chain_id(&self) -> Result<u64, Error> {
        Ok(self.chain_id)
    }

    fn signers(&self) -> Vec<Address> {
        self.signers.clone()
    }

    async fn balance(&self, account: Address) -> Result<U256, Error> {
        Ok(self.state().balances.get(&account).copied().unwrap_or_default())
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, Error> {
        Ok(self.state().code.get(&address).cloned().unwrap_or_default())
    }

    async fn deploy(&self, from: Address, init_code: Bytes) -> Result<Receipt, Error> {
        let mut state = self.state();
        self.check_sender(&state, from)?;
        state.transactions.push((from, None));

        let nonce = state.next_nonce(from);
        let transaction_hash = transaction_hash(from, nonce);
        if state.revert_deployments {
            return Ok(Receipt {
                transaction_hash,
                success: false,
                contract_address: None,
                gas_used: DEPLOY_GAS,
            });
        }

        let address = from.create(nonce);
        let gas_used = DEPLOY_GAS + 200 * init_code.len() as u64;
        state.code.insert(address, init_code);
        state.daos.insert(
            address,
            Membership {
                admin: from,
                ..Default::default()
            },
        );
        Ok(Receipt {
            transaction_hash,
            success: true,
            contract_address: Some(address),
            gas_used,
        })
    }

    async fn transact(&self, from: Address, to: Address, input: Bytes) -> Result<Receipt, Error> {
        let mut state = self.state();
        self.check_sender(&state, from)?;
        let call = Call::decode(&input);
        state.transactions.push((from, call.clone()));

        if let Some(dao) = state.daos.get_mut(&to) {
            match call {
                Some(Call::ApplyForMembership) => {
                    if dao.members.contains(&from) || !dao.applicants.insert(from) {
                        return Err(revert("already applied"));
                    }
                }
                Some(Call::ApproveMembership(member)) => {
                    if from != dao.admin {
                        return Err(revert("only the admin can approve members"));
                    }
                    if !dao.applicants.remove(&member) {
                        return Err(revert("not an applicant"));
                    }
                    dao.members.insert(member);
                }
                None => return Err(Error::Revert { reason: None }),
            }
        }

        let nonce = state.next_nonce(from);
        Ok(Receipt {
            transaction_hash: transaction_hash(from, nonce),
            success: true,
            contract_address: None,
            gas_used: CALL_GAS,
        })
    }
}
