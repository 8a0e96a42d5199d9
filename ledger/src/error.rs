//! Ledger error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: u64, available: u64 },

    #[error("Insufficient allowance: requested {requested}, approved {approved}")]
    InsufficientAllowance { requested: u64, approved: u64 },

    #[error("Arithmetic overflow while {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
