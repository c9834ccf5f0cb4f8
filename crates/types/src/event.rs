use crate::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Notifications published after a registry mutation has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RegistryEvent {
    /// An address was (re-)registered by the owner.
    VoterRegistered { voter: Address },
    /// Ownership changed hands. `previous_owner` is zero for the initial
    /// assignment at deployment.
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
}

impl RegistryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::VoterRegistered { .. } => "VoterRegistered",
            RegistryEvent::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::VoterRegistered { voter } => write!(f, "VoterRegistered({voter})"),
            RegistryEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => write!(f, "OwnershipTransferred({previous_owner}, {new_owner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_is_tagged() {
        let voter = Address::new([7u8; 20]);
        let json = serde_json::to_value(RegistryEvent::VoterRegistered { voter }).unwrap();
        assert_eq!(json["type"], "VoterRegistered");
        assert_eq!(json["voter"], voter.to_string());
    }

    #[test]
    fn display_names_arguments() {
        let event = RegistryEvent::OwnershipTransferred {
            previous_owner: Address::ZERO,
            new_owner: Address::new([1u8; 20]),
        };
        assert_eq!(event.name(), "OwnershipTransferred");
        assert!(event.to_string().starts_with("OwnershipTransferred(0x0000"));
    }
}
