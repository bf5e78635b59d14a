use std::collections::HashMap;

use alloy_primitives::B256;
use async_trait::async_trait;
use helix_common::{ProposerDuty, ValidatorSummary};
use helix_types::BlsPublicKeyBytes;
use tokio::sync::broadcast::Sender;

use crate::{
    error::BeaconClientError,
    types::{HeadEventData, StateId, SyncStatus},
};

#[async_trait]
pub trait BeaconClientTrait: Send + Sync + Clone {
    async fn sync_status(&self) -> Result<SyncStatus, BeaconClientError>;

    async fn current_slot(&self) -> Result<u64, BeaconClientError>;

    /// Streams head events into `chan` until the channel has no receivers left.
    async fn subscribe_to_head_events(
        &self,
        chan: Sender<HeadEventData>,
    ) -> Result<(), BeaconClientError>;

    async fn get_state_validators(
        &self,
        state_id: StateId,
    ) -> Result<Vec<ValidatorSummary>, BeaconClientError>;

    /// Active and pending validators in the state at `head_slot`, keyed by public key.
    async fn fetch_validators(
        &self,
        head_slot: u64,
    ) -> Result<HashMap<BlsPublicKeyBytes, ValidatorSummary>, BeaconClientError> {
        let validators = self.get_state_validators(StateId::Slot(head_slot)).await?;
        Ok(validators.into_iter().map(|v| (v.validator.pubkey, v)).collect())
    }

    async fn get_proposer_duties(
        &self,
        epoch: u64,
    ) -> Result<(B256, Vec<ProposerDuty>), BeaconClientError>;

    fn get_uri(&self) -> String;
}

#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait MultiBeaconClientTrait: Send + Sync + 'static {
    /// First sync status reported by a node that is not syncing.
    async fn best_sync_status(&self) -> Result<SyncStatus, BeaconClientError>;

    async fn subscribe_to_head_events(&self, chan: Sender<HeadEventData>);

    async fn fetch_validators(
        &self,
        head_slot: u64,
    ) -> Result<HashMap<BlsPublicKeyBytes, ValidatorSummary>, BeaconClientError>;

    async fn get_proposer_duties(
        &self,
        epoch: u64,
    ) -> Result<(B256, Vec<ProposerDuty>), BeaconClientError>;
}
