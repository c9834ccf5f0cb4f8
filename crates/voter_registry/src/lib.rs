//! Owner-gated voter registry.
//!
//! A single owner admits addresses into the registry. Every admission is
//! written to a [`StateStore`](voting_storage::StateStore) and then announced
//! to subscribed observers as a [`RegistryEvent`](voting_types::RegistryEvent).
//!
//! Authorization lives in [`OwnershipGuard`], which the registry consults
//! through the [`Ownable`] trait before any write. [`SharedRegistry`] wraps a
//! registry for concurrent callers and serializes all mutations.

pub mod errors;
pub mod events;
pub mod ownership;
pub mod registry;
pub mod service;

pub use errors::*;
pub use events::*;
pub use ownership::{Ownable, OwnershipGuard};
pub use registry::VoterRegistry;
pub use service::SharedRegistry;
