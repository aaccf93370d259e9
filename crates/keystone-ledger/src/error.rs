use thiserror::Error;

use crate::ledger::LedgerState;

/// Errors from ledger operations.
///
/// Lifecycle errors are recoverable only by accepting the current state;
/// nothing in this crate forces a transition backwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger is {state}; appends require an open ledger")]
    Locked { state: LedgerState },

    #[error("ledger is already {state}")]
    AlreadyLocked { state: LedgerState },

    #[error("seal failed: {0}")]
    Seal(#[from] SealError),

    #[error("integrity violation at block {index}: {reason}")]
    IntegrityViolation { index: u64, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger mutex poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SealError {
    #[error("ledger must be locked before it can be sealed")]
    NotLocked,

    #[error("ledger is already sealed")]
    AlreadySealed,
}
