use {
    alloy::{
        primitives::Address,
        providers::PendingTransactionError,
        sol_types::decode_revert_reason,
        transports::{RpcError, TransportError},
    },
    thiserror::Error,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The EVM reverted, either while the node estimated gas or after the
    /// transaction got mined.
    #[error("execution reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Revert { reason: Option<String> },
    #[error("insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("no signer for account {0}")]
    UnknownSigner(Address),
    #[error("node error: {0}")]
    Node(String),
}

impl Error {
    /// Returns whether the contract rejected the transaction, as opposed to
    /// the node or the transport failing.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Revert { .. })
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        let RpcError::ErrorResp(payload) = &err else {
            return Self::Node(err.to_string());
        };
        // Nodes don't agree on how reverts are reported. Anvil attaches the
        // revert data, Hardhat only mentions the reason in the message.
        if let Some(data) = payload.as_revert_data() {
            return Self::Revert {
                reason: decode_revert_reason(&data).or_else(|| reason_from_message(&payload.message)),
            };
        }
        let message = payload.message.to_lowercase();
        if message.contains("revert") {
            Self::Revert {
                reason: reason_from_message(&payload.message),
            }
        } else if message.contains("insufficient funds") {
            Self::InsufficientFunds(payload.message.to_string())
        } else {
            tracing::debug!(?err, "rpc error");
            Self::Node(err.to_string())
        }
    }
}

impl From<PendingTransactionError> for Error {
    fn from(err: PendingTransactionError) -> Self {
        match err {
            PendingTransactionError::TransportError(err) => err.into(),
            err => Self::Node(err.to_string()),
        }
    }
}

fn reason_from_message(message: &str) -> Option<String> {
    let reason = if let Some((_, reason)) = message.split_once("reverted with reason string '") {
        reason.trim_end_matches('\'')
    } else if let Some((_, reason)) = message.split_once("reverted: ") {
        reason
    } else {
        return None;
    };
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_owned())
}
