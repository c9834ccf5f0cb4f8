//! Error types for the voter registry

use thiserror::Error;
use voting_types::Address;

/// The caller is not the current owner.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Unauthorized account: {actor}")]
pub struct AuthorizationError {
    pub actor: Address,
}

#[derive(Error, Debug)]
pub enum OwnershipError {
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    #[error("Invalid owner: {owner}")]
    InvalidOwner { owner: Address },

    #[error("Registry already initialized with owner {owner}")]
    AlreadyInitialized { owner: Address },

    #[error("Registry not initialized: no owner in store")]
    NotInitialized,

    #[error("Registry storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Unauthorized account: {actor}")]
    Unauthorized { actor: Address },

    #[error("Registry storage error: {0}")]
    StorageError(#[from] anyhow::Error),
}

impl From<AuthorizationError> for RegistrationError {
    fn from(err: AuthorizationError) -> Self {
        RegistrationError::Unauthorized { actor: err.actor }
    }
}

pub type Result<T, E = RegistrationError> = std::result::Result<T, E>;
