//! Mintgate Ledger Module
//!
//! The fungible-ledger collaborator: account balances, total supply,
//! credits, transfers and the allowance surface. Supply-cap policy lives
//! in the controller core; this crate only guards arithmetic.

pub mod accounts;
pub mod error;

pub use accounts::Ledger;
pub use error::{LedgerError, Result};
