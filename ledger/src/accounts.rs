//! Account balances and transfers

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{LedgerError, Result};

/// Balance ledger for one token instance.
///
/// Keys are string addresses. Allowances are keyed by (owner, spender).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<String, u64>,
    allowances: HashMap<(String, String), u64>,
    total_supply: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &str) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &str, spender: &str) -> u64 {
        self.allowances
            .get(&(owner.to_string(), spender.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Credit new tokens to an account, increasing total supply.
    ///
    /// Cap enforcement is the controller's job; only overflow is checked
    /// here.
    pub fn credit(&mut self, account: &str, amount: u64) -> Result<()> {
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow("increasing total supply".to_string()))?;

        let balance = self.balances.entry(account.to_string()).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow("crediting balance".to_string()))?;
        self.total_supply = new_supply;

        Ok(())
    }

    pub fn transfer(&mut self, from: &str, to: &str, amount: u64) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        // Read the recipient as if the debit already happened, so a
        // self-transfer nets out instead of double-counting
        let recipient = if from == to {
            available - amount
        } else {
            self.balance_of(to)
        };
        let credited = recipient
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow("crediting recipient".to_string()))?;

        self.balances.insert(from.to_string(), available - amount);
        self.balances.insert(to.to_string(), credited);

        Ok(())
    }

    pub fn approve(&mut self, owner: &str, spender: &str, amount: u64) {
        self.allowances
            .insert((owner.to_string(), spender.to_string()), amount);
    }

    /// Spend an allowance: debits `from`, credits `to`, reduces what
    /// `spender` may still move.
    pub fn transfer_from(
        &mut self,
        spender: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<()> {
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(LedgerError::InsufficientAllowance {
                requested: amount,
                approved,
            });
        }

        self.transfer(from, to, amount)?;
        self.allowances
            .insert((from.to_string(), spender.to_string()), approved - amount);

        Ok(())
    }
}
