//! Controller deployment registry

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use fees::FeeCalculator;
use mintgate_core::{ControllerError, MintReceipt, TokenController};
use mintgate_storage::ControllerStore;

use crate::error::{FactoryError, Result};

/// A recorded minter-transfer proposal.
///
/// The commit replays `set_minter` as the proposer, so a proposal made by
/// an identity that has since lost the minter role cannot be approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMinter {
    pub proposed_by: String,
    pub candidate: String,
}

/// Deploys and proxies token controller instances.
///
/// Instances live behind per-id mutexes; every public operation against
/// one instance holds its lock end to end, so same-instance calls
/// serialize while different instances run in parallel.
pub struct TokenFactory {
    calculator: Arc<dyn FeeCalculator + Send + Sync>,
    instances: DashMap<String, Arc<Mutex<TokenController>>>,
    pending_minters: DashMap<String, PendingMinter>,
    fee_vault: DashMap<String, u64>,
    store: Option<ControllerStore>,
}

impl TokenFactory {
    /// In-memory factory, nothing persisted.
    pub fn new(calculator: Arc<dyn FeeCalculator + Send + Sync>) -> Self {
        Self {
            calculator,
            instances: DashMap::new(),
            pending_minters: DashMap::new(),
            fee_vault: DashMap::new(),
            store: None,
        }
    }

    /// Store-backed factory; reloads every controller record and fee
    /// balance the store already holds.
    pub fn with_store(
        calculator: Arc<dyn FeeCalculator + Send + Sync>,
        store: ControllerStore,
    ) -> Result<Self> {
        let factory = Self {
            calculator,
            instances: DashMap::new(),
            pending_minters: DashMap::new(),
            fee_vault: DashMap::new(),
            store: Some(store),
        };

        if let Some(store) = &factory.store {
            for (id, controller) in store.load_all_controllers()? {
                factory
                    .instances
                    .insert(id, Arc::new(Mutex::new(controller)));
            }
            for (id, proposed_by, candidate) in store.load_all_pending_minters()? {
                factory.pending_minters.insert(
                    id,
                    PendingMinter {
                        proposed_by,
                        candidate,
                    },
                );
            }
            for (collector, balance) in store.load_fee_balances()? {
                factory.fee_vault.insert(collector, balance);
            }
        }

        log::info!(
            "factory loaded {} controller(s) from store",
            factory.instances.len()
        );

        Ok(factory)
    }

    /// Clone the blank template and initialize it in one step.
    ///
    /// Returns the new controller id. Validation failures deploy nothing.
    pub fn deploy(
        &self,
        name: &str,
        symbol: &str,
        minter: &str,
        cap: u64,
        fee_collector: &str,
    ) -> Result<String> {
        let mut controller = TokenController::uninitialized();
        controller.initialize(name, symbol, minter, cap, fee_collector)?;

        let id = uuid::Uuid::new_v4().to_string();
        self.persist(&id, &controller)?;
        self.instances
            .insert(id.clone(), Arc::new(Mutex::new(controller)));

        Ok(id)
    }

    /// Mint through a deployed controller, forwarding the attached
    /// payment to the collector's vault entry in the same locked section.
    ///
    /// The mint runs against a copy of the record; the copy and the
    /// staged vault balance become visible only after both have been
    /// persisted, so a storage failure leaves no trace in memory.
    pub fn mint(
        &self,
        id: &str,
        caller: &str,
        account: &str,
        value: u64,
        payment: u64,
    ) -> Result<MintReceipt> {
        let cell = self.controller_cell(id)?;
        let mut controller = cell.lock();

        let mut updated = controller.clone();
        let receipt = updated.mint(caller, account, value, payment, self.calculator.as_ref())?;

        let mut vault = self.fee_vault.entry(receipt.collector.clone()).or_insert(0);
        let balance = vault
            .checked_add(receipt.payment)
            .ok_or_else(|| FactoryError::FeeVaultOverflow(receipt.collector.clone()))?;

        if let Some(store) = &self.store {
            store.save_mint(id, &updated, &receipt.collector, balance)?;
        }

        *vault = balance;
        drop(vault);
        *controller = updated;

        Ok(receipt)
    }

    pub fn pause(&self, id: &str, caller: &str) -> Result<()> {
        self.mutate(id, |c| c.pause(caller))
    }

    pub fn unpause(&self, id: &str, caller: &str) -> Result<()> {
        self.mutate(id, |c| c.unpause(caller))
    }

    /// Record a minter-transfer proposal. Current-minter-only, blocked
    /// while paused, and the candidate must not be the zero identity.
    pub fn propose_minter(&self, id: &str, caller: &str, candidate: &str) -> Result<()> {
        let cell = self.controller_cell(id)?;
        let controller = cell.lock();

        if !controller.is_minter(caller) {
            return Err(ControllerError::Unauthorized(caller.to_string()).into());
        }
        if controller.is_paused() {
            return Err(ControllerError::WrongPauseState("paused".to_string()).into());
        }
        if candidate.is_empty() {
            return Err(ControllerError::InvalidParameter(
                "candidate is the zero identity".to_string(),
            )
            .into());
        }

        // Durable before visible: a restart must not drop the proposal
        if let Some(store) = &self.store {
            store.save_pending_minter(id, caller, candidate)?;
        }

        self.pending_minters.insert(
            id.to_string(),
            PendingMinter {
                proposed_by: caller.to_string(),
                candidate: candidate.to_string(),
            },
        );

        Ok(())
    }

    /// Commit a pending minter transfer. Only the proposed identity may
    /// approve, and the commit replays `set_minter` as the proposer —
    /// a stale proposal (proposer replaced, or instance paused) fails.
    pub fn approve_minter(&self, id: &str, caller: &str) -> Result<()> {
        let pending = self
            .pending_minters
            .get(id)
            .map(|p| p.value().clone())
            .ok_or_else(|| FactoryError::NoPendingMinter(id.to_string()))?;

        if pending.candidate != caller {
            return Err(FactoryError::NotProposedMinter(caller.to_string()));
        }

        let cell = self.controller_cell(id)?;
        let mut controller = cell.lock();

        let mut updated = controller.clone();
        updated.set_minter(&pending.proposed_by, &pending.candidate)?;

        // One transaction: new record in, pending proposal out
        if let Some(store) = &self.store {
            store.save_minter_approval(id, &updated)?;
        }

        *controller = updated;
        self.pending_minters.remove(id);

        Ok(())
    }

    // --- proxied ledger operations ---

    pub fn transfer(&self, id: &str, from: &str, to: &str, amount: u64) -> Result<()> {
        self.mutate(id, |c| c.transfer(from, to, amount))
    }

    pub fn approve(&self, id: &str, owner: &str, spender: &str, amount: u64) -> Result<()> {
        self.mutate(id, |c| {
            c.approve(owner, spender, amount);
            Ok(())
        })
    }

    pub fn transfer_from(
        &self,
        id: &str,
        spender: &str,
        from: &str,
        to: &str,
        amount: u64,
    ) -> Result<()> {
        self.mutate(id, |c| c.transfer_from(spender, from, to, amount))
    }

    // --- reads ---

    pub fn token_name(&self, id: &str) -> Result<String> {
        self.read(id, |c| c.name().to_string())
    }

    pub fn token_symbol(&self, id: &str) -> Result<String> {
        self.read(id, |c| c.symbol().to_string())
    }

    pub fn decimals(&self, id: &str) -> Result<u8> {
        self.read(id, |c| c.decimals())
    }

    pub fn cap(&self, id: &str) -> Result<u64> {
        self.read(id, |c| c.cap())
    }

    pub fn total_supply(&self, id: &str) -> Result<u64> {
        self.read(id, |c| c.total_supply())
    }

    pub fn is_minter(&self, id: &str, identity: &str) -> Result<bool> {
        self.read(id, |c| c.is_minter(identity))
    }

    pub fn is_initialized(&self, id: &str) -> Result<bool> {
        self.read(id, |c| c.is_initialized())
    }

    pub fn is_paused(&self, id: &str) -> Result<bool> {
        self.read(id, |c| c.is_paused())
    }

    pub fn balance_of(&self, id: &str, account: &str) -> Result<u64> {
        self.read(id, |c| c.balance_of(account))
    }

    pub fn allowance(&self, id: &str, owner: &str, spender: &str) -> Result<u64> {
        self.read(id, |c| c.allowance(owner, spender))
    }

    pub fn pending_minter(&self, id: &str) -> Option<PendingMinter> {
        self.pending_minters.get(id).map(|p| p.value().clone())
    }

    /// Payments forwarded to a collector so far.
    pub fn fee_balance(&self, collector: &str) -> u64 {
        self.fee_vault.get(collector).map(|b| *b).unwrap_or(0)
    }

    pub fn controller_ids(&self) -> Vec<String> {
        self.instances.iter().map(|e| e.key().clone()).collect()
    }

    // --- internals ---

    fn controller_cell(&self, id: &str) -> Result<Arc<Mutex<TokenController>>> {
        let entry = self
            .instances
            .get(id)
            .ok_or_else(|| FactoryError::ControllerNotFound(id.to_string()))?;
        Ok(entry.value().clone())
    }

    /// Apply `op` to a copy of the record, persist the copy, then swap
    /// it in. A failure at any step leaves the live record untouched.
    fn mutate<R>(
        &self,
        id: &str,
        op: impl FnOnce(&mut TokenController) -> mintgate_core::Result<R>,
    ) -> Result<R> {
        let cell = self.controller_cell(id)?;
        let mut controller = cell.lock();

        let mut updated = controller.clone();
        let result = op(&mut updated)?;
        self.persist(id, &updated)?;
        *controller = updated;

        Ok(result)
    }

    fn read<R>(&self, id: &str, op: impl FnOnce(&TokenController) -> R) -> Result<R> {
        let cell = self.controller_cell(id)?;
        let controller = cell.lock();
        Ok(op(&controller))
    }

    fn persist(&self, id: &str, controller: &TokenController) -> Result<()> {
        if let Some(store) = &self.store {
            store.save_controller(id, controller)?;
        }
        Ok(())
    }
}
