//! Fee calculation models

use serde::{Deserialize, Serialize};

use crate::constants::{BPS_DENOMINATOR, SCARCITY_SCALE};

/// Prices a mint of `amount` tokens against a controller capped at `cap`.
///
/// Implementations must be deterministic and side-effect-free; the
/// controller calls this once per mint and compares the result against
/// the attached payment.
pub trait FeeCalculator {
    fn calculate_fee(&self, amount: u64, cap: u64) -> u64;
}

/// Basis-point fee: `amount * bps / 10_000`, rounded up.
///
/// Rounding up means a nonzero mint never prices at zero while bps > 0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BasisPointsCalculator {
    pub bps: u32,
}

impl BasisPointsCalculator {
    pub fn new(bps: u32) -> Self {
        Self { bps }
    }
}

impl FeeCalculator for BasisPointsCalculator {
    fn calculate_fee(&self, amount: u64, cap: u64) -> u64 {
        let _ = cap;
        if amount == 0 || self.bps == 0 {
            return 0;
        }
        let raw = amount as u128 * self.bps as u128;
        let fee = raw.div_ceil(BPS_DENOMINATOR as u128);
        u64::try_from(fee).unwrap_or(u64::MAX)
    }
}

/// Scarcity-scaled fee: a per-token base fee multiplied by how much of
/// the cap the mint consumes.
///
/// A mint taking the whole cap pays double the base rate; a mint taking a
/// sliver pays roughly the base rate. Still a pure function of
/// (amount, cap).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScarcityCalculator {
    pub base_fee_per_token: u64,
}

impl ScarcityCalculator {
    pub fn new(base_fee_per_token: u64) -> Self {
        Self { base_fee_per_token }
    }
}

impl FeeCalculator for ScarcityCalculator {
    fn calculate_fee(&self, amount: u64, cap: u64) -> u64 {
        if amount == 0 || cap == 0 {
            return 0;
        }
        let base = amount as u128 * self.base_fee_per_token as u128;
        // multiplier = 1 + amount/cap, in SCARCITY_SCALE fixed point
        let ratio = amount as u128 * SCARCITY_SCALE as u128 / cap as u128;
        let scaled = base * (SCARCITY_SCALE as u128 + ratio) / SCARCITY_SCALE as u128;
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

/// Fixed fee per mint regardless of amount.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlatCalculator {
    pub fee: u64,
}

impl FlatCalculator {
    pub fn new(fee: u64) -> Self {
        Self { fee }
    }
}

impl FeeCalculator for FlatCalculator {
    fn calculate_fee(&self, amount: u64, _cap: u64) -> u64 {
        if amount == 0 {
            return 0;
        }
        self.fee
    }
}
