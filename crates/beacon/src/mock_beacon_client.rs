use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy_primitives::B256;
use async_trait::async_trait;
use helix_common::{ProposerDuty, Validator, ValidatorStatus, ValidatorSummary};
use helix_types::BlsPublicKeyBytes;
use tokio::sync::broadcast::Sender;

use crate::{
    error::BeaconClientError,
    traits::BeaconClientTrait,
    types::{HeadEventData, StateId, SyncStatus},
};

const SLOTS_PER_EPOCH: u64 = 32;

/// Beacon client returning canned responses, optionally delayed or failing.
#[derive(Clone, Default)]
pub struct MockBeaconClient {
    sync_status: SyncStatus,
    state_validators: Vec<ValidatorSummary>,
    proposer_duties: (B256, Vec<ProposerDuty>),
    head_events: Vec<HeadEventData>,
    response_delay: Duration,
    fail: bool,
    state_validators_calls: Arc<AtomicUsize>,
}

impl MockBeaconClient {
    pub fn new() -> Self {
        Self {
            sync_status: SyncStatus { head_slot: 10, sync_distance: 0, is_syncing: false },
            ..Default::default()
        }
    }

    pub fn with_sync_status(mut self, sync_status: SyncStatus) -> Self {
        self.sync_status = sync_status;
        self
    }

    pub fn with_state_validators(mut self, state_validators: Vec<ValidatorSummary>) -> Self {
        self.state_validators = state_validators;
        self
    }

    /// Duties are served per epoch, filtered by slot.
    pub fn with_proposer_duties(mut self, proposer_duties: (B256, Vec<ProposerDuty>)) -> Self {
        self.proposer_duties = proposer_duties;
        self
    }

    pub fn with_head_events(mut self, head_events: Vec<HeadEventData>) -> Self {
        self.head_events = head_events;
        self
    }

    pub fn with_response_delay(mut self, response_delay: Duration) -> Self {
        self.response_delay = response_delay;
        self
    }

    /// Every request fails with `BeaconNodeUnavailable`.
    pub fn with_error(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn state_validators_calls(&self) -> usize {
        self.state_validators_calls.load(Ordering::Relaxed)
    }

    /// Active validator with a pubkey derived from its index.
    pub fn validator(index: u64) -> ValidatorSummary {
        Self::validator_with_pubkey(index, Self::pubkey_for_index(index))
    }

    pub fn validator_with_pubkey(index: u64, pubkey: BlsPublicKeyBytes) -> ValidatorSummary {
        ValidatorSummary {
            index,
            balance: 32_000_000_000,
            status: ValidatorStatus::ActiveOngoing,
            validator: Validator {
                pubkey,
                withdrawal_credentials: B256::ZERO,
                effective_balance: 32_000_000_000,
                slashed: false,
                activation_eligibility_epoch: 0,
                activation_epoch: 0,
                exit_epoch: u64::MAX,
                withdrawable_epoch: u64::MAX,
            },
        }
    }

    pub fn pubkey_for_index(index: u64) -> BlsPublicKeyBytes {
        let mut bytes = [0u8; 48];
        bytes[40..].copy_from_slice(&index.to_be_bytes());
        BlsPublicKeyBytes::from(bytes)
    }

    async fn respond(&self) -> Result<(), BeaconClientError> {
        if !self.response_delay.is_zero() {
            tokio::time::sleep(self.response_delay).await;
        }
        if self.fail {
            return Err(BeaconClientError::BeaconNodeUnavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl BeaconClientTrait for MockBeaconClient {
    async fn sync_status(&self) -> Result<SyncStatus, BeaconClientError> {
        self.respond().await?;
        Ok(self.sync_status.clone())
    }

    async fn current_slot(&self) -> Result<u64, BeaconClientError> {
        self.respond().await?;
        Ok(self.sync_status.head_slot)
    }

    async fn subscribe_to_head_events(
        &self,
        chan: Sender<HeadEventData>,
    ) -> Result<(), BeaconClientError> {
        self.respond().await?;
        for event in self.head_events.iter().cloned() {
            chan.send(event).map_err(|_| BeaconClientError::HeadEventChannelClosed)?;
        }
        Ok(())
    }

    async fn get_state_validators(
        &self,
        _state_id: StateId,
    ) -> Result<Vec<ValidatorSummary>, BeaconClientError> {
        self.state_validators_calls.fetch_add(1, Ordering::Relaxed);
        self.respond().await?;
        Ok(self.state_validators.clone())
    }

    async fn get_proposer_duties(
        &self,
        epoch: u64,
    ) -> Result<(B256, Vec<ProposerDuty>), BeaconClientError> {
        self.respond().await?;
        let (dependent_root, duties) = &self.proposer_duties;
        let duties =
            duties.iter().filter(|duty| duty.slot / SLOTS_PER_EPOCH == epoch).cloned().collect();
        Ok((*dependent_root, duties))
    }

    fn get_uri(&self) -> String {
        "test_uri".to_string()
    }
}
