//! Mintgate Core Library
//!
//! The token controller state machine: one-shot initialization, capped
//! supply, a single minter role, a pause gate, and fee-gated minting.
//! Balances live in the `ledger` collaborator; fee pricing lives in the
//! `fees` collaborator.

pub mod controller;
pub mod error;

// Re-export main types
pub use controller::{MintReceipt, TokenController};
pub use error::{ControllerError, Result};

/// Core constants
pub mod constants {
    /// Controllers mint whole tokens only
    pub const TOKEN_DECIMALS: u8 = 0;

    /// The zero/null identity: an empty address string
    pub const ZERO_IDENTITY: &str = "";
}
