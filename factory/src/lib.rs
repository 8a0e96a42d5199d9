//! Mintgate Factory Module
//!
//! Deploys controller instances from the blank template, serializes all
//! state-changing calls per instance, forwards mint payments into the
//! fee vault, and runs the two-phase minter transfer:
//! - `propose_minter` by the current minter
//! - `approve_minter` by the proposed identity
//!
//! Every successful mutation is persisted before the call returns when a
//! store is attached.

pub mod error;
pub mod registry;

pub use error::{FactoryError, Result};
pub use registry::{PendingMinter, TokenFactory};
