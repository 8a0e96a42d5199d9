//! Token controller state machine

use serde::{Deserialize, Serialize};

use fees::FeeCalculator;
use ledger::Ledger;

use crate::constants::{TOKEN_DECIMALS, ZERO_IDENTITY};
use crate::error::{ControllerError, Result};

/// Outcome of a successful mint: what was credited and what payment must
/// be forwarded to the fee collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintReceipt {
    pub account: String,
    pub amount: u64,
    pub fee_required: u64,
    pub payment: u64,
    pub collector: String,
}

/// A capped, fee-gated, pausable mintable token instance.
///
/// One record per deployed instance. The `initialized` latch is one-way:
/// a blank template can be configured exactly once, either through
/// [`TokenController::new`] or through [`TokenController::initialize`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenController {
    initialized: bool,
    name: String,
    symbol: String,
    decimals: u8,
    cap: u64,
    minter: String,
    fee_collector: String,
    paused: bool,
    ledger: Ledger,
}

impl TokenController {
    /// Blank template state: not initialized, all defaults.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Construct and configure in one step.
    ///
    /// Same validation as [`initialize`](Self::initialize), minus the
    /// latch check — a fresh value cannot already be initialized.
    pub fn new(
        name: &str,
        symbol: &str,
        minter: &str,
        cap: u64,
        fee_collector: &str,
    ) -> Result<Self> {
        let mut controller = Self::uninitialized();
        controller.configure(name, symbol, minter, cap, fee_collector)?;
        Ok(controller)
    }

    /// One-shot initialization of a cloned template.
    pub fn initialize(
        &mut self,
        name: &str,
        symbol: &str,
        minter: &str,
        cap: u64,
        fee_collector: &str,
    ) -> Result<()> {
        if self.initialized {
            return Err(ControllerError::AlreadyInitialized);
        }
        self.configure(name, symbol, minter, cap, fee_collector)
    }

    /// Validate parameters and assign every field as one step.
    ///
    /// All checks run before the first assignment, so a failure leaves
    /// the controller untouched.
    fn configure(
        &mut self,
        name: &str,
        symbol: &str,
        minter: &str,
        cap: u64,
        fee_collector: &str,
    ) -> Result<()> {
        if minter == ZERO_IDENTITY {
            return Err(ControllerError::InvalidParameter(
                "minter is the zero identity".to_string(),
            ));
        }
        if fee_collector == ZERO_IDENTITY {
            return Err(ControllerError::InvalidParameter(
                "fee collector is the zero identity".to_string(),
            ));
        }
        if cap == 0 {
            return Err(ControllerError::InvalidParameter(
                "cap must be positive".to_string(),
            ));
        }
        // Defense in depth against a partially configured instance
        if self.minter != ZERO_IDENTITY {
            return Err(ControllerError::InvalidParameter(
                "minter already set".to_string(),
            ));
        }

        self.name = name.to_string();
        self.symbol = symbol.to_string();
        self.decimals = TOKEN_DECIMALS;
        self.cap = cap;
        self.minter = minter.to_string();
        self.fee_collector = fee_collector.to_string();
        self.initialized = true;

        log::info!(
            "controller initialized: {} ({}), cap {}, minter {}",
            self.name,
            self.symbol,
            self.cap,
            self.minter
        );

        Ok(())
    }

    /// Mint `value` tokens to `account` against an attached `payment`.
    ///
    /// Minter-only, Active-only. The cap check uses the current supply;
    /// the fee is priced against the cap, never the post-mint supply.
    /// All preconditions pass before anything mutates.
    pub fn mint(
        &mut self,
        caller: &str,
        account: &str,
        value: u64,
        payment: u64,
        calculator: &dyn FeeCalculator,
    ) -> Result<MintReceipt> {
        self.ensure_minter(caller)?;
        self.ensure_active()?;

        let supply = self.ledger.total_supply();
        let new_supply = supply.checked_add(value).ok_or(ControllerError::CapExceeded {
            supply,
            amount: value,
            cap: self.cap,
        })?;
        if new_supply > self.cap {
            return Err(ControllerError::CapExceeded {
                supply,
                amount: value,
                cap: self.cap,
            });
        }

        let fee_required = calculator.calculate_fee(value, self.cap);
        if payment < fee_required {
            return Err(ControllerError::InsufficientFee {
                required: fee_required,
                provided: payment,
            });
        }

        // Cannot fail after the cap check; the ledger only guards overflow
        self.ledger.credit(account, value)?;

        Ok(MintReceipt {
            account: account.to_string(),
            amount: value,
            fee_required,
            payment,
            collector: self.fee_collector.clone(),
        })
    }

    pub fn pause(&mut self, caller: &str) -> Result<()> {
        self.ensure_minter(caller)?;
        if self.paused {
            return Err(ControllerError::WrongPauseState(
                "already paused".to_string(),
            ));
        }
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self, caller: &str) -> Result<()> {
        self.ensure_minter(caller)?;
        if !self.paused {
            return Err(ControllerError::WrongPauseState("not paused".to_string()));
        }
        self.paused = false;
        Ok(())
    }

    /// Replace the minter. Minter-only, Active-only, and the new identity
    /// must not be the zero identity.
    pub fn set_minter(&mut self, caller: &str, new_minter: &str) -> Result<()> {
        self.ensure_minter(caller)?;
        self.ensure_active()?;
        if new_minter == ZERO_IDENTITY {
            return Err(ControllerError::InvalidParameter(
                "new minter is the zero identity".to_string(),
            ));
        }
        log::info!("minter changed: {} -> {}", self.minter, new_minter);
        self.minter = new_minter.to_string();
        Ok(())
    }

    // --- read accessors (pure, valid in any state) ---

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn cap(&self) -> u64 {
        self.cap
    }

    pub fn fee_collector(&self) -> &str {
        &self.fee_collector
    }

    pub fn is_minter(&self, identity: &str) -> bool {
        self.initialized && self.minter == identity
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn total_supply(&self) -> u64 {
        self.ledger.total_supply()
    }

    pub fn balance_of(&self, account: &str) -> u64 {
        self.ledger.balance_of(account)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.ledger.allowance(owner, spender)
    }

    // --- ledger pass-throughs, not gated by pause or minter ---

    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<()> {
        self.ledger.transfer(from, to, amount)?;
        Ok(())
    }

    pub fn approve(&mut self, owner: &str, spender: &str, amount: u64) {
        self.ledger.approve(owner, spender, amount);
    }

    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<()> {
        self.ledger.transfer_from(spender, from, to, amount)?;
        Ok(())
    }

    // --- guards ---

    fn ensure_minter(&self, caller: &str) -> Result<()> {
        if !self.is_minter(caller) {
            return Err(ControllerError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.paused {
            return Err(ControllerError::WrongPauseState("paused".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fees::FlatCalculator;

    fn controller() -> TokenController {
        TokenController::new("Demo Token", "DT1", "minter-1", 1000, "collector-1").unwrap()
    }

    #[test]
    fn test_new_validates_parameters() {
        assert!(matches!(
            TokenController::new("T", "T", "", 1000, "c").unwrap_err(),
            ControllerError::InvalidParameter(_)
        ));
        assert!(matches!(
            TokenController::new("T", "T", "m", 1000, "").unwrap_err(),
            ControllerError::InvalidParameter(_)
        ));
        assert!(matches!(
            TokenController::new("T", "T", "m", 0, "c").unwrap_err(),
            ControllerError::InvalidParameter(_)
        ));
    }

    #[test]
    fn test_initialize_is_exactly_once() {
        let mut c = TokenController::uninitialized();
        assert!(!c.is_initialized());

        c.initialize("Demo Token", "DT1", "minter-1", 1000, "collector-1")
            .unwrap();
        assert!(c.is_initialized());
        assert_eq!(c.cap(), 1000);
        assert_eq!(c.decimals(), 0);

        // Second call fails and changes nothing
        let err = c
            .initialize("Other", "OT", "minter-2", 5000, "collector-2")
            .unwrap_err();
        assert_eq!(err, ControllerError::AlreadyInitialized);
        assert_eq!(c.name(), "Demo Token");
        assert_eq!(c.cap(), 1000);
        assert!(c.is_minter("minter-1"));
        assert!(!c.is_minter("minter-2"));
    }

    #[test]
    fn test_mint_credits_and_reports_fee() {
        let mut c = controller();
        let calc = FlatCalculator::new(25);

        let receipt = c.mint("minter-1", "alice", 400, 30, &calc).unwrap();
        assert_eq!(receipt.amount, 400);
        assert_eq!(receipt.fee_required, 25);
        assert_eq!(receipt.payment, 30);
        assert_eq!(receipt.collector, "collector-1");
        assert_eq!(c.balance_of("alice"), 400);
        assert_eq!(c.total_supply(), 400);
    }

    #[test]
    fn test_mint_exact_fee_succeeds() {
        let mut c = controller();
        let calc = FlatCalculator::new(25);

        c.mint("minter-1", "alice", 1, 25, &calc).unwrap();
        assert_eq!(c.total_supply(), 1);
    }

    #[test]
    fn test_mint_insufficient_fee() {
        let mut c = controller();
        let calc = FlatCalculator::new(25);

        let err = c.mint("minter-1", "alice", 1, 24, &calc).unwrap_err();
        assert_eq!(
            err,
            ControllerError::InsufficientFee {
                required: 25,
                provided: 24
            }
        );
        assert_eq!(c.total_supply(), 0);
        assert_eq!(c.balance_of("alice"), 0);
    }

    #[test]
    fn test_cap_invariant() {
        let mut c = controller();
        let calc = FlatCalculator::new(0);

        // Mint the whole cap in one shot
        c.mint("minter-1", "alice", 1000, 0, &calc).unwrap();
        assert_eq!(c.total_supply(), 1000);

        // One more token fails regardless of payment
        let err = c.mint("minter-1", "alice", 1, 1_000_000, &calc).unwrap_err();
        assert_eq!(
            err,
            ControllerError::CapExceeded {
                supply: 1000,
                amount: 1,
                cap: 1000
            }
        );
        assert_eq!(c.total_supply(), 1000);
    }

    #[test]
    fn test_mint_supply_overflow_is_cap_exceeded() {
        let mut c = controller();
        let calc = FlatCalculator::new(0);
        c.mint("minter-1", "alice", 1000, 0, &calc).unwrap();

        let err = c.mint("minter-1", "alice", u64::MAX, 0, &calc).unwrap_err();
        assert!(matches!(err, ControllerError::CapExceeded { .. }));
    }

    #[test]
    fn test_mint_unauthorized() {
        let mut c = controller();
        let calc = FlatCalculator::new(0);

        let err = c.mint("mallory", "mallory", 10, 100, &calc).unwrap_err();
        assert_eq!(err, ControllerError::Unauthorized("mallory".to_string()));
        assert_eq!(c.total_supply(), 0);
    }

    #[test]
    fn test_pause_gates_mint_and_set_minter() {
        let mut c = controller();
        let calc = FlatCalculator::new(0);

        c.pause("minter-1").unwrap();
        assert!(c.is_paused());

        assert!(matches!(
            c.mint("minter-1", "alice", 1, 0, &calc).unwrap_err(),
            ControllerError::WrongPauseState(_)
        ));
        assert!(matches!(
            c.set_minter("minter-1", "minter-2").unwrap_err(),
            ControllerError::WrongPauseState(_)
        ));

        c.unpause("minter-1").unwrap();
        c.mint("minter-1", "alice", 1, 0, &calc).unwrap();
        assert_eq!(c.total_supply(), 1);
    }

    #[test]
    fn test_pause_unpause_wrong_state() {
        let mut c = controller();

        assert!(matches!(
            c.unpause("minter-1").unwrap_err(),
            ControllerError::WrongPauseState(_)
        ));

        c.pause("minter-1").unwrap();
        assert!(matches!(
            c.pause("minter-1").unwrap_err(),
            ControllerError::WrongPauseState(_)
        ));
    }

    #[test]
    fn test_pause_unauthorized() {
        let mut c = controller();

        assert!(matches!(
            c.pause("mallory").unwrap_err(),
            ControllerError::Unauthorized(_)
        ));
        assert!(!c.is_paused());
    }

    #[test]
    fn test_set_minter_replaces_authority() {
        let mut c = controller();
        let calc = FlatCalculator::new(0);

        c.set_minter("minter-1", "minter-2").unwrap();
        assert!(c.is_minter("minter-2"));
        assert!(!c.is_minter("minter-1"));

        // Old minter is locked out
        assert!(matches!(
            c.mint("minter-1", "alice", 1, 0, &calc).unwrap_err(),
            ControllerError::Unauthorized(_)
        ));
        c.mint("minter-2", "alice", 1, 0, &calc).unwrap();
    }

    #[test]
    fn test_set_minter_rejects_zero_identity() {
        let mut c = controller();

        let err = c.set_minter("minter-1", "").unwrap_err();
        assert!(matches!(err, ControllerError::InvalidParameter(_)));
        assert!(c.is_minter("minter-1"));
    }

    #[test]
    fn test_reads_before_initialization() {
        let c = TokenController::uninitialized();

        assert!(!c.is_initialized());
        assert!(!c.is_paused());
        assert!(!c.is_minter(""));
        assert_eq!(c.name(), "");
        assert_eq!(c.cap(), 0);
        assert_eq!(c.total_supply(), 0);
    }

    #[test]
    fn test_reads_are_stable() {
        let c = controller();

        assert_eq!(c.is_initialized(), c.is_initialized());
        assert_eq!(c.is_paused(), c.is_paused());
        assert_eq!(c.is_minter("minter-1"), c.is_minter("minter-1"));
    }

    #[test]
    fn test_fee_is_priced_against_cap() {
        struct CapRecorder;
        impl fees::FeeCalculator for CapRecorder {
            fn calculate_fee(&self, amount: u64, cap: u64) -> u64 {
                // fee encodes the cap it saw
                assert_eq!(cap, 1000);
                amount
            }
        }

        let mut c = controller();
        c.mint("minter-1", "alice", 600, 600, &CapRecorder).unwrap();
        // Second mint still prices against the cap, not remaining supply
        c.mint("minter-1", "alice", 100, 100, &CapRecorder).unwrap();
    }
}
