//! Thread-safe handle around a [`VoterRegistry`].
//!
//! All mutations take the write lock and publish their events before
//! releasing it, so observers see events in commit order. Reads share the
//! read lock and always see a fully committed state.

use crate::errors::*;
use crate::events::RegistryObserver;
use crate::ownership::{Ownable, OwnershipGuard};
use crate::registry::VoterRegistry;
use parking_lot::RwLock;
use std::sync::Arc;
use voting_types::{Address, RegistryEvent, VoterRecord};

pub struct SharedRegistry<A: Ownable = OwnershipGuard> {
    inner: Arc<RwLock<VoterRegistry<A>>>,
}

impl<A: Ownable> Clone for SharedRegistry<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Ownable> From<VoterRegistry<A>> for SharedRegistry<A> {
    fn from(registry: VoterRegistry<A>) -> Self {
        Self::new(registry)
    }
}

impl<A: Ownable> SharedRegistry<A> {
    pub fn new(registry: VoterRegistry<A>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    pub fn register_voter(&self, caller: &Address, voter: Address) -> Result<()> {
        self.inner.write().register_voter(caller, voter)
    }

    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), OwnershipError> {
        self.inner.write().transfer_ownership(caller, new_owner)
    }

    pub fn is_registered(&self, voter: &Address) -> bool {
        self.inner.read().is_registered(voter)
    }

    pub fn voter(&self, voter: &Address) -> VoterRecord {
        self.inner.read().voter(voter)
    }

    pub fn registered_voters(&self) -> Vec<Address> {
        self.inner.read().registered_voters()
    }

    pub fn current_owner(&self) -> Address {
        self.inner.read().current_owner()
    }

    pub fn subscribe(&self, observer: Arc<dyn RegistryObserver>) {
        self.inner.write().subscribe(observer);
    }

    pub fn subscribe_channel(&self) -> tokio::sync::mpsc::UnboundedReceiver<RegistryEvent> {
        self.inner.write().subscribe_channel()
    }

    pub fn flush(&self) -> anyhow::Result<()> {
        self.inner.read().flush()
    }
}
