use alloy::{
    primitives::{Address, Bytes},
    sol_types::{SolCall, SolInterface},
};

/// Name the contract is compiled, deployed and looked up under.
pub const CONTRACT_NAME: &str = "PolygonDAO";

alloy::sol! {
    #[allow(missing_docs)]
    interface PolygonDAO {
        function applyForMembership() external;
        function approveMembership(address member) external;
    }
}

pub fn apply_for_membership() -> Bytes {
    PolygonDAO::applyForMembershipCall {}.abi_encode().into()
}

pub fn approve_membership(member: Address) -> Bytes {
    PolygonDAO::approveMembershipCall { member }.abi_encode().into()
}

/// Calls of the DAO interface, recovered from transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    ApplyForMembership,
    ApproveMembership(Address),
}

impl Call {
    pub fn decode(input: &[u8]) -> Option<Self> {
        match PolygonDAO::PolygonDAOCalls::abi_decode(input).ok()? {
            PolygonDAO::PolygonDAOCalls::applyForMembership(_) => Some(Self::ApplyForMembership),
            PolygonDAO::PolygonDAOCalls::approveMembership(call) => {
                Some(Self::ApproveMembership(call.member))
            }
        }
    }
}
