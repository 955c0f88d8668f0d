//! Compiled contract fixtures.

use {
    alloy::{json_abi::JsonAbi, primitives::Bytes},
    contracts::{Artifact, Artifacts, polygon_dao::CONTRACT_NAME},
};

const POLYGON_DAO_ABI: [&str; 2] = [
    "function applyForMembership()",
    "function approveMembership(address member)",
];

pub fn polygon_dao() -> Artifact {
    polygon_dao_with_bytecode(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40, 0x52, 0x01]))
}

/// Same interface, different code. Use it to simulate a recompiled contract.
pub fn polygon_dao_with_bytecode(bytecode: Bytes) -> Artifact {
    Artifact {
        contract_name: CONTRACT_NAME.to_owned(),
        abi: JsonAbi::parse(POLYGON_DAO_ABI).expect("valid human readable ABI"),
        bytecode,
    }
}

pub fn with_polygon_dao() -> Artifacts {
    Artifacts::default().with(polygon_dao())
}
