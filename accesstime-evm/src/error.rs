//! Errors raised by chain reads and transactions.

use accesstime::AccessTimeError;
use alloy_primitives::TxHash;
use alloy_provider::PendingTransactionError;
use alloy_transport::TransportError;

/// Failure of a chain read, a transaction, or its preconditions.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// RPC transport error.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Error waiting for a transaction receipt (timeout, etc.).
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    /// On-chain transaction was reverted.
    #[error("Transaction {0} reverted")]
    TransactionReverted(TxHash),
    /// Contract call failed.
    #[error("Contract call failed: {0}")]
    ContractCall(String),
    /// The action was rejected before reaching the chain.
    #[error(transparent)]
    Rejected(#[from] AccessTimeError),
}

impl From<alloy_contract::Error> for ChainError {
    fn from(e: alloy_contract::Error) -> Self {
        match e {
            alloy_contract::Error::UnknownFunction(_)
            | alloy_contract::Error::UnknownSelector(_)
            | alloy_contract::Error::NotADeploymentTransaction
            | alloy_contract::Error::ContractNotDeployed
            | alloy_contract::Error::ZeroData(_, _)
            | alloy_contract::Error::AbiError(_) => Self::ContractCall(e.to_string()),
            alloy_contract::Error::TransportError(e) => Self::Transport(e),
            alloy_contract::Error::PendingTransactionError(e) => Self::PendingTransaction(e),
        }
    }
}

impl ChainError {
    /// The precondition that rejected the action, if that is what failed.
    #[must_use]
    pub const fn rejection(&self) -> Option<AccessTimeError> {
        match self {
            Self::Rejected(e) => Some(*e),
            _ => None,
        }
    }
}
