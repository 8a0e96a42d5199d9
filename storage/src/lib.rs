//! Mintgate Storage Module
//!
//! Sled-backed persistence for controller records and the fee vault.
//! One record per controller instance, keyed by its id.

pub mod store;

pub use store::{ControllerStore, StorageError};
