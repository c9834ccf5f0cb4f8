//! Core types shared by the voter registry crates.
//!
//! - [`Address`]: the identity of an owner or a participant
//! - [`VoterRecord`]: per-address registration state
//! - [`RegistryEvent`]: notifications emitted after a committed mutation

pub mod address;
pub mod event;
pub mod record;

pub use address::*;
pub use event::*;
pub use record::*;
