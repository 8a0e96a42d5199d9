//! Controller error types

use thiserror::Error;

/// Token controller errors
///
/// Every variant is a precondition failure detected before any mutation;
/// a failed call leaves the controller exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Controller already initialized")]
    AlreadyInitialized,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unauthorized: {0} is not the minter")]
    Unauthorized(String),

    #[error("Wrong pause state: {0}")]
    WrongPauseState(String),

    #[error("Cap exceeded: supply {supply} + {amount} > cap {cap}")]
    CapExceeded { supply: u64, amount: u64, cap: u64 },

    #[error("Insufficient fee: required {required}, provided {provided}")]
    InsufficientFee { required: u64, provided: u64 },

    #[error(transparent)]
    Ledger(#[from] ledger::LedgerError),
}

pub type Result<T> = std::result::Result<T, ControllerError>;
