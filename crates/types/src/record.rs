use serde::{Deserialize, Serialize};

/// Registration state held for a single address.
///
/// An address that was never touched reads as the default record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub is_registered: bool,
}

impl VoterRecord {
    pub const fn registered() -> Self {
        Self {
            is_registered: true,
        }
    }
}
