//! Factory error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Controller not found: {0}")]
    ControllerNotFound(String),

    #[error("No pending minter for controller {0}")]
    NoPendingMinter(String),

    #[error("Unauthorized: {0} is not the proposed minter")]
    NotProposedMinter(String),

    #[error("Fee vault overflow for collector {0}")]
    FeeVaultOverflow(String),

    #[error(transparent)]
    Controller(#[from] mintgate_core::ControllerError),

    #[error(transparent)]
    Storage(#[from] mintgate_storage::StorageError),
}

pub type Result<T> = std::result::Result<T, FactoryError>;
