//! Sled-based persistence for controller state

use std::path::Path;

use thiserror::Error;

use mintgate_core::TokenController;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable store for controller records, pending minter transfers and
/// collected fee balances.
///
/// Keys: `controller:{id}` for bincode-encoded records,
/// `pending_minter:{id}` for in-flight minter proposals,
/// `fee_vault:{collector}` for little-endian u64 balances. Every write
/// flushes so state survives a restart.
#[derive(Debug, Clone)]
pub struct ControllerStore {
    db: sled::Db,
    path: String,
}

impl ControllerStore {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let db = sled::open(&path)
            .map_err(|e| StorageError::IoError(format!("Failed to open database: {}", e)))?;

        Ok(ControllerStore { db, path: path_str })
    }

    /// Get the database path
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Save a controller record to disk
    pub fn save_controller(&self, id: &str, controller: &TokenController) -> Result<()> {
        let key = format!("controller:{}", id);
        let value = bincode::serialize(controller)
            .map_err(|e| StorageError::IoError(format!("Failed to serialize controller: {}", e)))?;

        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| StorageError::IoError(format!("Failed to save controller: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| StorageError::IoError(format!("Failed to flush controller: {}", e)))?;

        Ok(())
    }

    /// Load a controller record by id
    pub fn load_controller(&self, id: &str) -> Result<Option<TokenController>> {
        let key = format!("controller:{}", id);

        match self.db.get(key.as_bytes()) {
            Ok(Some(data)) => {
                let controller = bincode::deserialize(&data).map_err(|e| {
                    StorageError::IoError(format!("Failed to deserialize controller: {}", e))
                })?;
                Ok(Some(controller))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::IoError(format!(
                "Failed to load controller: {}",
                e
            ))),
        }
    }

    /// Load every stored controller record
    pub fn load_all_controllers(&self) -> Result<Vec<(String, TokenController)>> {
        let mut controllers = Vec::new();
        let prefix = b"controller:";

        for item in self.db.scan_prefix(prefix) {
            match item {
                Ok((key, value)) => {
                    let id = String::from_utf8_lossy(&key[prefix.len()..]).to_string();
                    let controller = bincode::deserialize(&value).map_err(|e| {
                        StorageError::IoError(format!("Failed to deserialize controller: {}", e))
                    })?;
                    controllers.push((id, controller));
                }
                Err(e) => {
                    return Err(StorageError::IoError(format!(
                        "Failed to scan controllers: {}",
                        e
                    )))
                }
            }
        }

        Ok(controllers)
    }

    /// Save an in-flight minter-transfer proposal
    pub fn save_pending_minter(
        &self,
        id: &str,
        proposed_by: &str,
        candidate: &str,
    ) -> Result<()> {
        let key = format!("pending_minter:{}", id);
        let value = bincode::serialize(&(proposed_by, candidate)).map_err(|e| {
            StorageError::IoError(format!("Failed to serialize pending minter: {}", e))
        })?;

        self.db
            .insert(key.as_bytes(), value)
            .map_err(|e| StorageError::IoError(format!("Failed to save pending minter: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| StorageError::IoError(format!("Failed to flush pending minter: {}", e)))?;

        Ok(())
    }

    /// Load a pending minter proposal as (proposed_by, candidate)
    pub fn load_pending_minter(&self, id: &str) -> Result<Option<(String, String)>> {
        let key = format!("pending_minter:{}", id);

        match self.db.get(key.as_bytes()) {
            Ok(Some(data)) => {
                let pending = bincode::deserialize(&data).map_err(|e| {
                    StorageError::IoError(format!("Failed to deserialize pending minter: {}", e))
                })?;
                Ok(Some(pending))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::IoError(format!(
                "Failed to load pending minter: {}",
                e
            ))),
        }
    }

    /// Load every pending minter proposal as (id, proposed_by, candidate)
    pub fn load_all_pending_minters(&self) -> Result<Vec<(String, String, String)>> {
        let mut pendings = Vec::new();
        let prefix = b"pending_minter:";

        for item in self.db.scan_prefix(prefix) {
            match item {
                Ok((key, value)) => {
                    let id = String::from_utf8_lossy(&key[prefix.len()..]).to_string();
                    let (proposed_by, candidate): (String, String) = bincode::deserialize(&value)
                        .map_err(|e| {
                        StorageError::IoError(format!(
                            "Failed to deserialize pending minter: {}",
                            e
                        ))
                    })?;
                    pendings.push((id, proposed_by, candidate));
                }
                Err(e) => {
                    return Err(StorageError::IoError(format!(
                        "Failed to scan pending minters: {}",
                        e
                    )))
                }
            }
        }

        Ok(pendings)
    }

    /// Save a mint outcome: the controller record and the collector's
    /// balance land in one transaction, so a failure persists neither.
    pub fn save_mint(
        &self,
        id: &str,
        controller: &TokenController,
        collector: &str,
        balance: u64,
    ) -> Result<()> {
        let controller_key = format!("controller:{}", id);
        let controller_value = bincode::serialize(controller)
            .map_err(|e| StorageError::IoError(format!("Failed to serialize controller: {}", e)))?;
        let vault_key = format!("fee_vault:{}", collector);
        let vault_value = balance.to_le_bytes();

        let result: std::result::Result<(), sled::transaction::TransactionError<()>> =
            self.db.transaction(|tx| {
                tx.insert(controller_key.as_bytes(), controller_value.clone())?;
                tx.insert(vault_key.as_bytes(), &vault_value)?;
                Ok(())
            });
        result.map_err(|e| StorageError::IoError(format!("Failed to save mint: {:?}", e)))?;

        self.db
            .flush()
            .map_err(|e| StorageError::IoError(format!("Failed to flush mint: {}", e)))?;

        Ok(())
    }

    /// Commit a minter transfer: save the updated controller record and
    /// clear its pending proposal in one transaction.
    pub fn save_minter_approval(&self, id: &str, controller: &TokenController) -> Result<()> {
        let controller_key = format!("controller:{}", id);
        let controller_value = bincode::serialize(controller)
            .map_err(|e| StorageError::IoError(format!("Failed to serialize controller: {}", e)))?;
        let pending_key = format!("pending_minter:{}", id);

        let result: std::result::Result<(), sled::transaction::TransactionError<()>> =
            self.db.transaction(|tx| {
                tx.insert(controller_key.as_bytes(), controller_value.clone())?;
                tx.remove(pending_key.as_bytes())?;
                Ok(())
            });
        result.map_err(|e| {
            StorageError::IoError(format!("Failed to save minter approval: {:?}", e))
        })?;

        self.db
            .flush()
            .map_err(|e| StorageError::IoError(format!("Failed to flush minter approval: {}", e)))?;

        Ok(())
    }

    /// Save a fee collector's accumulated balance
    pub fn save_fee_balance(&self, collector: &str, balance: u64) -> Result<()> {
        let key = format!("fee_vault:{}", collector);
        let value = balance.to_le_bytes();

        self.db
            .insert(key.as_bytes(), &value)
            .map_err(|e| StorageError::IoError(format!("Failed to save fee balance: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| StorageError::IoError(format!("Failed to flush fee balance: {}", e)))?;

        Ok(())
    }

    /// Load a fee collector's accumulated balance
    pub fn load_fee_balance(&self, collector: &str) -> Result<Option<u64>> {
        let key = format!("fee_vault:{}", collector);

        match self.db.get(key.as_bytes()) {
            Ok(Some(data)) => {
                if data.len() == 8 {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(&data);
                    Ok(Some(u64::from_le_bytes(bytes)))
                } else {
                    Err(StorageError::IoError("Invalid fee balance data".to_string()))
                }
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StorageError::IoError(format!(
                "Failed to load fee balance: {}",
                e
            ))),
        }
    }

    /// Load every fee collector balance
    pub fn load_fee_balances(&self) -> Result<Vec<(String, u64)>> {
        let mut balances = Vec::new();
        let prefix = b"fee_vault:";

        for item in self.db.scan_prefix(prefix) {
            match item {
                Ok((key, value)) => {
                    if value.len() != 8 {
                        return Err(StorageError::IoError(
                            "Invalid fee balance data".to_string(),
                        ));
                    }
                    let collector = String::from_utf8_lossy(&key[prefix.len()..]).to_string();
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(&value);
                    balances.push((collector, u64::from_le_bytes(bytes)));
                }
                Err(e) => {
                    return Err(StorageError::IoError(format!(
                        "Failed to scan fee balances: {}",
                        e
                    )))
                }
            }
        }

        Ok(balances)
    }
}
