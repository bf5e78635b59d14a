use std::fmt;

use alloy_primitives::B256;
use helix_types::Slot;
use serde::{Deserialize, Serialize};

/// State selector of `eth/v1/beacon/states/{state_id}/...` requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateId {
    Slot(Slot),
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateId::Slot(slot) => write!(f, "{slot}"),
        }
    }
}

/// Response of `eth/v1/node/syncing`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStatus {
    #[serde(with = "serde_utils::quoted_u64")]
    pub head_slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub sync_distance: u64,
    pub is_syncing: bool,
}

/// Payload of a `head` SSE event. Extra fields such as `execution_optimistic` are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadEventData {
    #[serde(with = "serde_utils::quoted_u64")]
    pub slot: Slot,
    pub block: B256,
    pub state: B256,
    #[serde(default)]
    pub epoch_transition: bool,
}
