//! Single-owner access control.

use crate::errors::{AuthorizationError, OwnershipError};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use voting_storage::StateStore;
use voting_types::Address;

/// Authority consulted by the registry before every mutation.
pub trait Ownable {
    /// The identity currently allowed to perform privileged operations.
    fn owner(&self) -> Address;

    /// Succeeds iff `caller` is the current owner. Never mutates.
    fn check_authorized(&self, caller: &Address) -> Result<(), AuthorizationError> {
        if *caller == self.owner() {
            Ok(())
        } else {
            Err(AuthorizationError { actor: *caller })
        }
    }

    /// Hand ownership to `new_owner` and return the previous owner.
    ///
    /// Authorization is checked first. The zero address is never accepted.
    fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, OwnershipError>;
}

/// Durable owner slot.
///
/// The owner is cached in memory and written through to the store, so reads
/// never touch the backend.
pub struct OwnershipGuard {
    owner: Address,
    store: Arc<dyn StateStore>,
}

impl OwnershipGuard {
    /// Assign the first owner. Fails if the store already has one.
    ///
    /// The check and the write are a single store operation, so of two
    /// concurrent initializations exactly one succeeds.
    pub fn initialize(store: Arc<dyn StateStore>, caller: Address) -> Result<Self, OwnershipError> {
        if caller.is_zero() {
            return Err(OwnershipError::InvalidOwner { owner: caller });
        }

        if let Some(owner) = store.init_owner(&caller)? {
            return Err(OwnershipError::AlreadyInitialized { owner });
        }
        info!(owner = %caller, "Ownership initialized");

        Ok(Self {
            owner: caller,
            store,
        })
    }

    /// Load the owner of an already-initialized store.
    pub fn open(store: Arc<dyn StateStore>) -> Result<Self, OwnershipError> {
        let owner = store.get_owner()?.ok_or(OwnershipError::NotInitialized)?;
        Ok(Self { owner, store })
    }
}

impl Ownable for OwnershipGuard {
    fn owner(&self) -> Address {
        self.owner
    }

    fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<Address, OwnershipError> {
        if let Err(err) = self.check_authorized(caller) {
            warn!(actor = %caller, "Rejected ownership transfer from non-owner");
            return Err(err.into());
        }

        if new_owner.is_zero() {
            return Err(OwnershipError::InvalidOwner { owner: new_owner });
        }

        self.store.set_owner(&new_owner)?;
        let previous = std::mem::replace(&mut self.owner, new_owner);
        info!(previous = %previous, new_owner = %new_owner, "Ownership transferred");

        Ok(previous)
    }
}

impl fmt::Debug for OwnershipGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnershipGuard")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voting_storage::MemoryStorage;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    fn guard(owner: Address) -> (OwnershipGuard, Arc<MemoryStorage>) {
        let store = Arc::new(MemoryStorage::new());
        let guard = OwnershipGuard::initialize(store.clone(), owner).unwrap();
        (guard, store)
    }

    #[test]
    fn initialize_sets_owner_and_persists() {
        let (guard, store) = guard(addr(1));
        assert_eq!(guard.owner(), addr(1));
        assert_eq!(store.get_owner().unwrap(), Some(addr(1)));
    }

    #[test]
    fn initialize_rejects_zero_owner() {
        let store = Arc::new(MemoryStorage::new());
        let err = OwnershipGuard::initialize(store.clone(), Address::ZERO).unwrap_err();
        assert!(matches!(err, OwnershipError::InvalidOwner { .. }));
        assert_eq!(store.get_owner().unwrap(), None);
    }

    #[test]
    fn initialize_twice_is_rejected() {
        let (_guard, store) = guard(addr(1));
        let err = OwnershipGuard::initialize(store, addr(2)).unwrap_err();
        assert!(matches!(err, OwnershipError::AlreadyInitialized { owner } if owner == addr(1)));
    }

    #[test]
    fn concurrent_initialization_has_one_winner() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStorage::new());
        let handles: Vec<_> = (1..=8u8)
            .map(|b| {
                let store = store.clone();
                std::thread::spawn(move || OwnershipGuard::initialize(store, addr(b)))
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            match handle.join().unwrap() {
                Ok(guard) => winners.push(guard.owner()),
                Err(err) => assert!(matches!(err, OwnershipError::AlreadyInitialized { .. })),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(store.get_owner().unwrap(), Some(winners[0]));
    }

    #[test]
    fn open_requires_owner() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStorage::new());
        assert!(matches!(
            OwnershipGuard::open(store.clone()).unwrap_err(),
            OwnershipError::NotInitialized
        ));

        store.set_owner(&addr(5)).unwrap();
        assert_eq!(OwnershipGuard::open(store).unwrap().owner(), addr(5));
    }

    #[test]
    fn check_authorized_reports_actor() {
        let (guard, _) = guard(addr(1));
        assert!(guard.check_authorized(&addr(1)).is_ok());
        assert_eq!(
            guard.check_authorized(&addr(2)),
            Err(AuthorizationError { actor: addr(2) })
        );
    }

    #[test]
    fn transfer_moves_authority() {
        let (mut guard, store) = guard(addr(1));
        let previous = guard.transfer_ownership(&addr(1), addr(2)).unwrap();

        assert_eq!(previous, addr(1));
        assert_eq!(guard.owner(), addr(2));
        assert_eq!(store.get_owner().unwrap(), Some(addr(2)));
        assert!(guard.check_authorized(&addr(1)).is_err());
        assert!(guard.check_authorized(&addr(2)).is_ok());
    }

    #[test]
    fn transfer_from_non_owner_is_rejected() {
        let (mut guard, _) = guard(addr(1));
        let err = guard.transfer_ownership(&addr(2), addr(2)).unwrap_err();
        assert!(
            matches!(err, OwnershipError::Unauthorized(AuthorizationError { actor }) if actor == addr(2))
        );
        assert_eq!(guard.owner(), addr(1));
    }

    #[test]
    fn transfer_to_zero_is_rejected() {
        let (mut guard, store) = guard(addr(1));
        let err = guard.transfer_ownership(&addr(1), Address::ZERO).unwrap_err();
        assert!(matches!(err, OwnershipError::InvalidOwner { .. }));
        assert_eq!(guard.owner(), addr(1));
        assert_eq!(store.get_owner().unwrap(), Some(addr(1)));
    }

    #[test]
    fn non_owner_transfer_to_zero_reports_authorization_first() {
        let (mut guard, _) = guard(addr(1));
        let err = guard.transfer_ownership(&addr(9), Address::ZERO).unwrap_err();
        assert!(matches!(err, OwnershipError::Unauthorized(_)));
    }
}
