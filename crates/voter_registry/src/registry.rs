//! Voter registry implementation
//!
//! Holds the registration set and lets only the current owner grow it.
//! Records are cached in memory and written through to the [`StateStore`];
//! the cache is updated only after the store accepts the write, so a failed
//! write leaves no trace.

use crate::errors::*;
use crate::events::{EventBus, RegistryObserver};
use crate::ownership::{Ownable, OwnershipGuard};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use voting_storage::StateStore;
use voting_types::{Address, RegistryEvent, VoterRecord};

/// Owner-gated voter registry
pub struct VoterRegistry<A: Ownable = OwnershipGuard> {
    authority: A,
    records: HashMap<Address, VoterRecord>,
    store: Arc<dyn StateStore>,
    events: EventBus,
}

impl VoterRegistry<OwnershipGuard> {
    /// Deploy a fresh registry owned by `caller`.
    ///
    /// Publishes `OwnershipTransferred { previous_owner: ZERO, new_owner: caller }`
    /// to `events`. Claiming the owner slot is the last fallible step, so a
    /// failed deploy leaves the store without an owner.
    pub fn deploy(
        store: Arc<dyn StateStore>,
        caller: Address,
        events: EventBus,
    ) -> Result<Self, OwnershipError> {
        let records = store.list_voters()?;
        let authority = OwnershipGuard::initialize(store.clone(), caller)?;
        let registry = Self::from_parts(authority, records, store, events);
        registry.events.publish(RegistryEvent::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: caller,
        });
        Ok(registry)
    }

    /// Reopen a registry previously deployed on `store`.
    pub fn open(store: Arc<dyn StateStore>, events: EventBus) -> Result<Self, OwnershipError> {
        let authority = OwnershipGuard::open(store.clone())?;
        Self::with_authority(authority, store, events)
    }
}

impl<A: Ownable> VoterRegistry<A> {
    /// Build a registry around any authority, loading existing records.
    pub fn with_authority(
        authority: A,
        store: Arc<dyn StateStore>,
        events: EventBus,
    ) -> Result<Self, OwnershipError> {
        let records = store.list_voters()?;
        Ok(Self::from_parts(authority, records, store, events))
    }

    fn from_parts(
        authority: A,
        records: Vec<(Address, VoterRecord)>,
        store: Arc<dyn StateStore>,
        events: EventBus,
    ) -> Self {
        let records: HashMap<_, _> = records.into_iter().collect();
        debug!(records = records.len(), owner = %authority.owner(), "Loaded voter registry");

        Self {
            authority,
            records,
            store,
            events,
        }
    }

    /// Register `voter`. Only the current owner may call this.
    ///
    /// Re-registering an address succeeds, leaves state unchanged and
    /// publishes `VoterRegistered` again.
    pub fn register_voter(&mut self, caller: &Address, voter: Address) -> Result<()> {
        if let Err(err) = self.authority.check_authorized(caller) {
            warn!(actor = %caller, %voter, "Rejected voter registration from non-owner");
            return Err(err.into());
        }

        let record = VoterRecord::registered();
        self.store.put_voter(&voter, record)?;
        let previous = self.records.insert(voter, record);
        info!(%voter, repeat = previous.is_some(), "Voter registered");

        self.events.publish(RegistryEvent::VoterRegistered { voter });
        Ok(())
    }

    /// Transfer ownership through the underlying authority.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), OwnershipError> {
        let previous_owner = self.authority.transfer_ownership(caller, new_owner)?;
        self.events.publish(RegistryEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
        Ok(())
    }

    pub fn is_registered(&self, voter: &Address) -> bool {
        self.voter(voter).is_registered
    }

    /// Record for `voter`, or the default record if it was never registered.
    pub fn voter(&self, voter: &Address) -> VoterRecord {
        self.records.get(voter).copied().unwrap_or_default()
    }

    /// Every registered address, sorted.
    pub fn registered_voters(&self) -> Vec<Address> {
        let mut voters: Vec<Address> = self
            .records
            .iter()
            .filter(|(_, record)| record.is_registered)
            .map(|(voter, _)| *voter)
            .collect();
        voters.sort();
        voters
    }

    pub fn current_owner(&self) -> Address {
        self.authority.owner()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn RegistryObserver>) {
        self.events.subscribe(observer);
    }

    pub fn subscribe_channel(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<RegistryEvent> {
        self.events.subscribe_channel()
    }

    /// Flush the backing store.
    pub fn flush(&self) -> anyhow::Result<()> {
        self.store.flush()
    }
}

impl<A: Ownable> fmt::Debug for VoterRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoterRegistry")
            .field("owner", &self.authority.owner())
            .field("records", &self.records.len())
            .field("observers", &self.events.observer_count())
            .finish()
    }
}
