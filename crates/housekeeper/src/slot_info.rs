use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use arc_swap::ArcSwap;
use bytes::Bytes;
use helix_common::api::builder_api::BuilderGetValidatorsResponseEntry;
use helix_types::Slot;

/// Installed duty table together with its serialized `get_validators` response.
#[derive(Debug)]
pub struct ProposerDuties {
    pub entries: Vec<BuilderGetValidatorsResponseEntry>,
    pub response: Bytes,
}

impl Default for ProposerDuties {
    fn default() -> Self {
        Self { entries: Vec::new(), response: Bytes::from_static(b"[]") }
    }
}

/// All information that is refreshed every slot. Thread safe, clones share state.
#[derive(Clone, Default)]
pub struct CurrentSlotInfo {
    head_slot: Arc<AtomicU64>,
    proposer_duties: Arc<ArcSwap<ProposerDuties>>,
}

impl CurrentSlotInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn head_slot(&self) -> Slot {
        self.head_slot.load(Ordering::Acquire)
    }

    /// Advances the head slot. Returns the previous head if `slot` is newer, `None` otherwise.
    pub fn advance_head_slot(&self, slot: Slot) -> Option<Slot> {
        let prev = self.head_slot.fetch_max(slot, Ordering::AcqRel);
        (prev < slot).then_some(prev)
    }

    pub fn proposer_duties(&self) -> Arc<ProposerDuties> {
        self.proposer_duties.load_full()
    }

    /// Serialized duty table, `[]` until the first install.
    pub fn proposer_duties_response(&self) -> Bytes {
        self.proposer_duties.load().response.clone()
    }

    /// Serializes `entries` and swaps the table in whole. Returns the number of duties installed.
    pub fn install_proposer_duties(
        &self,
        entries: Vec<BuilderGetValidatorsResponseEntry>,
    ) -> Result<usize, serde_json::Error> {
        let response = Bytes::from(serde_json::to_vec(&entries)?);
        let num_duties = entries.len();
        self.proposer_duties.store(Arc::new(ProposerDuties { entries, response }));
        Ok(num_duties)
    }
}

#[cfg(test)]
mod tests {
    use helix_types::test_utils::{random_secret_key, signed_registration};

    use super::*;

    #[test]
    fn test_empty_duties_response() {
        let slot_info = CurrentSlotInfo::new();
        assert_eq!(&slot_info.proposer_duties_response()[..], b"[]");
        assert!(slot_info.proposer_duties().entries.is_empty());
    }

    #[test]
    fn test_install_replaces_table() {
        let slot_info = CurrentSlotInfo::new();
        let registration = signed_registration(&random_secret_key(), 100, Default::default());
        let entry =
            BuilderGetValidatorsResponseEntry { slot: 5, validator_index: 1, entry: registration };

        let installed = slot_info.install_proposer_duties(vec![entry.clone(), entry.clone()]);
        assert_eq!(installed.unwrap(), 2);
        assert_eq!(slot_info.install_proposer_duties(vec![entry.clone()]).unwrap(), 1);

        let expected = serde_json::to_vec(&vec![entry]).unwrap();
        assert_eq!(&slot_info.proposer_duties_response()[..], &expected[..]);
    }

    #[test]
    fn test_advance_head_slot() {
        let slot_info = CurrentSlotInfo::new();
        assert_eq!(slot_info.advance_head_slot(10), Some(0));
        assert_eq!(slot_info.advance_head_slot(9), None);
        assert_eq!(slot_info.advance_head_slot(10), None);
        assert_eq!(slot_info.advance_head_slot(12), Some(10));
        assert_eq!(slot_info.head_slot(), 12);
    }
}
