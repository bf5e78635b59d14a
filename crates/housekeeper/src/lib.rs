pub mod error;
pub mod housekeeper;
#[cfg(test)]
mod housekeeper_tests;
pub mod slot_info;

use std::sync::Arc;

pub use housekeeper::Housekeeper;
use helix_beacon::traits::MultiBeaconClientTrait;
use helix_common::{chain_info::ChainInfo, spawn_tracked};
use helix_datastore::{KnownValidatorCache, RegistrationStore};
pub use slot_info::{CurrentSlotInfo, ProposerDuties};
use tokio::sync::broadcast;
use tracing::error;

const HEAD_EVENT_CHANNEL_SIZE: usize = 100;

/// Subscribes to head events and runs the housekeeper loop in the background.
pub async fn start_housekeeper<B, R>(
    beacon_client: B,
    registrations: R,
    known_validators: Arc<KnownValidatorCache>,
    slot_info: CurrentSlotInfo,
    chain_info: Arc<ChainInfo>,
) -> Arc<Housekeeper<B, R>>
where
    B: MultiBeaconClientTrait,
    R: RegistrationStore,
{
    let (head_event_sender, mut head_event_receiver) = broadcast::channel(HEAD_EVENT_CHANNEL_SIZE);
    beacon_client.subscribe_to_head_events(head_event_sender).await;

    let housekeeper =
        Housekeeper::new(beacon_client, registrations, known_validators, slot_info, chain_info);
    let running = housekeeper.clone();
    spawn_tracked!(async move {
        if let Err(err) = running.start(&mut head_event_receiver).await {
            error!(%err, "housekeeper stopped");
        }
    });

    housekeeper
}
