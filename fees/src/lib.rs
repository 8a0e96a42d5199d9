//! Mintgate Fees Module
//!
//! Implements the fee models that price a mint:
//! - Basis-point pricing
//! - Scarcity-scaled pricing
//! - Flat per-mint pricing
//!
//! Every model is a pure function of (amount, cap); the controller core
//! only sees the `FeeCalculator` trait.

pub mod calculator;

pub use calculator::{
    BasisPointsCalculator, FeeCalculator, FlatCalculator, ScarcityCalculator,
};

/// Fee constants
pub mod constants {
    /// Denominator for basis-point fees (1 bps = 0.01%)
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Scale factor for the scarcity multiplier
    pub const SCARCITY_SCALE: u64 = 1_000_000;
}
