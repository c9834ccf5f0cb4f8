//! Durable key-value state for the voter registry.
//!
//! Two records are kept: the current owner, and one [`VoterRecord`] per
//! address that has ever been registered. Addresses that were never written
//! read back as `None` and are interpreted by callers as the default record.

use anyhow::{anyhow, Result};
use parking_lot::RwLock;
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use voting_types::{Address, VoterRecord, ADDRESS_BYTES};

const OWNER_KEY: &[u8] = b"owner";

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Corrupt voter key: expected {ADDRESS_BYTES} bytes, got {0}")]
    CorruptKey(usize),
}

/// Abstract storage trait
pub trait StateStore: Send + Sync {
    fn get_owner(&self) -> Result<Option<Address>>;
    fn set_owner(&self, owner: &Address) -> Result<()>;
    /// Store `owner` only if the slot is empty, as one atomic step.
    ///
    /// Returns `None` when the write happened, otherwise the owner already
    /// stored.
    fn init_owner(&self, owner: &Address) -> Result<Option<Address>>;
    fn get_voter(&self, voter: &Address) -> Result<Option<VoterRecord>>;
    fn put_voter(&self, voter: &Address, record: VoterRecord) -> Result<()>;
    /// All stored records, sorted by address.
    fn list_voters(&self) -> Result<Vec<(Address, VoterRecord)>>;
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Sled-backed implementation
pub struct SledStorage {
    db: Db,
    metadata: Tree,
    voters: Tree,
}

impl SledStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let metadata = db.open_tree("metadata")?;
        let voters = db.open_tree("voters")?;
        tracing::debug!(voters = voters.len(), "Opened sled registry store");

        Ok(Self {
            db,
            metadata,
            voters,
        })
    }
}

impl StateStore for SledStorage {
    fn get_owner(&self) -> Result<Option<Address>> {
        match self.metadata.get(OWNER_KEY)? {
            Some(v) => Ok(Some(serde_json::from_slice(&v)?)),
            None => Ok(None),
        }
    }

    fn set_owner(&self, owner: &Address) -> Result<()> {
        self.metadata.insert(OWNER_KEY, serde_json::to_vec(owner)?)?;
        Ok(())
    }

    fn init_owner(&self, owner: &Address) -> Result<Option<Address>> {
        let encoded = serde_json::to_vec(owner).map_err(StorageError::Serialization)?;
        let swapped = self
            .metadata
            .compare_and_swap(OWNER_KEY, None::<&[u8]>, Some(encoded))
            .map_err(StorageError::Database)?;

        match swapped {
            Ok(()) => Ok(None),
            Err(conflict) => {
                let current = conflict
                    .current
                    .ok_or_else(|| anyhow!("owner slot emptied during initialization"))?;
                let existing =
                    serde_json::from_slice(&current).map_err(StorageError::Serialization)?;
                Ok(Some(existing))
            }
        }
    }

    fn get_voter(&self, voter: &Address) -> Result<Option<VoterRecord>> {
        match self.voters.get(voter.as_bytes())? {
            Some(v) => Ok(Some(serde_json::from_slice(&v)?)),
            None => Ok(None),
        }
    }

    fn put_voter(&self, voter: &Address, record: VoterRecord) -> Result<()> {
        self.voters
            .insert(voter.as_bytes(), serde_json::to_vec(&record)?)?;
        Ok(())
    }

    fn list_voters(&self) -> Result<Vec<(Address, VoterRecord)>> {
        let mut out = Vec::new();
        for item in self.voters.iter() {
            let (k, v) = item.map_err(StorageError::Database)?;
            let bytes = <[u8; ADDRESS_BYTES]>::try_from(&k[..])
                .map_err(|_| StorageError::CorruptKey(k.len()))?;
            let record = serde_json::from_slice(&v).map_err(StorageError::Serialization)?;
            out.push((Address::new(bytes), record));
        }
        Ok(out)
    }

    fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

/// In-memory testing backend
#[derive(Default)]
pub struct MemoryStorage {
    owner: Arc<RwLock<Option<Address>>>,
    voters: Arc<RwLock<HashMap<Address, VoterRecord>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStorage {
    fn get_owner(&self) -> Result<Option<Address>> {
        Ok(*self.owner.read())
    }

    fn set_owner(&self, owner: &Address) -> Result<()> {
        *self.owner.write() = Some(*owner);
        Ok(())
    }

    fn init_owner(&self, owner: &Address) -> Result<Option<Address>> {
        let mut slot = self.owner.write();
        if let Some(existing) = *slot {
            return Ok(Some(existing));
        }
        *slot = Some(*owner);
        Ok(None)
    }

    fn get_voter(&self, voter: &Address) -> Result<Option<VoterRecord>> {
        Ok(self.voters.read().get(voter).copied())
    }

    fn put_voter(&self, voter: &Address, record: VoterRecord) -> Result<()> {
        self.voters.write().insert(*voter, record);
        Ok(())
    }

    fn list_voters(&self) -> Result<Vec<(Address, VoterRecord)>> {
        let mut out: Vec<_> = self
            .voters
            .read()
            .iter()
            .map(|(a, r)| (*a, *r))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}
