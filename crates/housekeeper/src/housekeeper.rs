use std::{collections::HashMap, sync::Arc, time::Duration};

use helix_beacon::{error::BeaconClientError, traits::MultiBeaconClientTrait, types::HeadEventData};
use helix_common::{
    api::builder_api::BuilderGetValidatorsResponseEntry, chain_info::ChainInfo, spawn_tracked,
    ProposerDuty, SignedValidatorRegistrationEntry,
};
use helix_datastore::{error::KnownValidatorsError, KnownValidatorCache, RegistrationStore};
use helix_types::{BlsPublicKeyBytes, Slot};
use tokio::{
    sync::{broadcast, Mutex},
    time::{interval_at, sleep, Instant},
};
use tracing::{debug, error, info, warn};

use crate::{error::HousekeeperError, slot_info::CurrentSlotInfo};

const PROPOSER_DUTIES_UPDATE_FREQ: u64 = 1;

// Constants for known validators refresh logic.
const MIN_SLOTS_BETWEEN_UPDATES: u64 = 6;
const MAX_SLOTS_BEFORE_FORCED_UPDATE: u64 = 32;
pub(crate) const SLEEP_DURATION_BEFORE_REFRESHING_VALIDATORS: Duration = Duration::from_secs(6);

/// Keeps the known validator set and the proposer duty table up to date.
///
/// Driven by head events, with a once per slot sync status poll as fallback when no head event
/// arrives. Each update runs in its own task and at most one of each kind runs at a time.
pub struct Housekeeper<B: MultiBeaconClientTrait, R: RegistrationStore> {
    beacon_client: B,
    registrations: R,
    known_validators: Arc<KnownValidatorCache>,
    slot_info: CurrentSlotInfo,
    chain_info: Arc<ChainInfo>,

    proposer_duties_slot: Mutex<u64>,
    proposer_duties_lock: Mutex<()>,

    refreshed_validators_slot: Mutex<Option<u64>>,
    validator_refresh_delay: Duration,
}

impl<B: MultiBeaconClientTrait, R: RegistrationStore> Housekeeper<B, R> {
    pub fn new(
        beacon_client: B,
        registrations: R,
        known_validators: Arc<KnownValidatorCache>,
        slot_info: CurrentSlotInfo,
        chain_info: Arc<ChainInfo>,
    ) -> Arc<Self> {
        Arc::new(Self::with_validator_refresh_delay(
            beacon_client,
            registrations,
            known_validators,
            slot_info,
            chain_info,
            SLEEP_DURATION_BEFORE_REFRESHING_VALIDATORS,
        ))
    }

    /// `delay` is how long into the slot periodic validator refreshes wait before fetching.
    /// The first refresh never waits.
    pub fn with_validator_refresh_delay(
        beacon_client: B,
        registrations: R,
        known_validators: Arc<KnownValidatorCache>,
        slot_info: CurrentSlotInfo,
        chain_info: Arc<ChainInfo>,
        delay: Duration,
    ) -> Self {
        Self {
            beacon_client,
            registrations,
            known_validators,
            slot_info,
            chain_info,
            proposer_duties_slot: Mutex::new(0),
            proposer_duties_lock: Mutex::new(()),
            refreshed_validators_slot: Mutex::new(None),
            validator_refresh_delay: delay,
        }
    }

    /// Runs until the head event channel closes.
    pub async fn start(
        self: &Arc<Self>,
        head_event_receiver: &mut broadcast::Receiver<HeadEventData>,
    ) -> Result<(), HousekeeperError> {
        self.poll_sync_status().await;

        loop {
            let period = Duration::from_secs(self.chain_info.seconds_per_slot());
            let mut timer = interval_at(Instant::now() + period, period);

            tokio::select! {
                head_event_result = head_event_receiver.recv() => {
                    match head_event_result {
                        Ok(head_event) => self.process_new_slot(head_event.slot).await,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("head events lagged by {n} events");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            error!("head event channel closed");
                            return Err(HousekeeperError::HeadEventChannelClosed);
                        }
                    }
                }
                _ = timer.tick() => self.poll_sync_status().await,
            }
        }
    }

    /// Picks up the head slot from the best synced beacon node.
    pub async fn poll_sync_status(self: &Arc<Self>) {
        match self.beacon_client.best_sync_status().await {
            Ok(sync_status) => self.process_new_slot(sync_status.head_slot).await,
            Err(err) => log_beacon_error(&err, "failed to get sync status"),
        }
    }

    /// Process updates for the given slot. Slots at or before the current head are skipped.
    pub async fn process_new_slot(self: &Arc<Self>, head_slot: Slot) {
        let Some(prev_head_slot) = self.slot_info.advance_head_slot(head_slot) else {
            return;
        };

        if self.should_update_duties(head_slot).await {
            let cloned_self = self.clone();
            spawn_tracked!(async move {
                let _ = cloned_self.update_proposer_duties(head_slot).await;
            });
        }

        if self.should_refresh_known_validators(head_slot).await {
            let cloned_self = self.clone();
            spawn_tracked!(async move {
                let _ = cloned_self.refresh_known_validators(head_slot).await;
            });
        }

        if prev_head_slot > 0 {
            for missed_slot in prev_head_slot + 1..head_slot {
                warn!(missed_slot);
            }
        }

        let epoch = self.chain_info.epoch_at(head_slot);
        debug!(
            epoch,
            head_slot,
            head_slot_pos = self.chain_info.slot_in_epoch(head_slot) + 1,
            slot_start_next_epoch = (epoch + 1) * self.chain_info.slots_per_epoch(),
            wall_clock_slot = self.chain_info.current_slot(),
            "updated head slot",
        );
    }

    /// Refreshes the known validator set at `head_slot`. Returns the number of validators.
    pub async fn refresh_known_validators(
        &self,
        head_slot: Slot,
    ) -> Result<usize, HousekeeperError> {
        if self.known_validators.is_loaded() && !self.validator_refresh_delay.is_zero() {
            sleep(self.validator_refresh_delay).await;
        }

        let num_known_validators =
            match self.known_validators.refresh(&self.beacon_client, head_slot).await {
                Ok(num_known_validators) => num_known_validators,
                Err(KnownValidatorsError::RefreshInProgress) => {
                    debug!(head_slot, "known validators refresh already running");
                    return Err(KnownValidatorsError::RefreshInProgress.into());
                }
                Err(KnownValidatorsError::BeaconClientError(err)) => {
                    log_beacon_error(&err, "failed to fetch validators");
                    return Err(err.into());
                }
            };

        *self.refreshed_validators_slot.lock().await = Some(head_slot);

        Ok(num_known_validators)
    }

    /// Refresh is due on the first slot seen, at epoch positions 4 and 20, and whenever more
    /// than `MAX_SLOTS_BEFORE_FORCED_UPDATE` slots passed since the last refresh.
    pub(crate) async fn should_refresh_known_validators(&self, head_slot: Slot) -> bool {
        let Some(last_refreshed_slot) = *self.refreshed_validators_slot.lock().await else {
            return true;
        };

        if head_slot <= last_refreshed_slot {
            return false;
        }

        let slots_since_last_update = head_slot - last_refreshed_slot;
        if slots_since_last_update < MIN_SLOTS_BETWEEN_UPDATES {
            return false;
        }

        if slots_since_last_update > MAX_SLOTS_BEFORE_FORCED_UPDATE {
            return true;
        }

        let head_slot_pos = self.chain_info.slot_in_epoch(head_slot) + 1;
        head_slot_pos == 4 || head_slot_pos == 20
    }

    /// Fetches duties for the current and next epoch, joins them with stored registrations and
    /// installs the result. Returns the number of duties installed.
    pub async fn update_proposer_duties(&self, head_slot: Slot) -> Result<usize, HousekeeperError> {
        let _guard = self.proposer_duties_lock.try_lock()?;

        let epoch = self.chain_info.epoch_at(head_slot);
        info!(epoch_from = epoch, epoch_to = epoch + 1, "Housekeeper::update_proposer_duties");

        let proposer_duties = match self.fetch_duties(epoch).await {
            Ok(proposer_duties) => proposer_duties,
            Err(err) => {
                log_beacon_error(&err, "failed to fetch proposer duties");
                return Err(err.into());
            }
        };

        let pubkeys: Vec<BlsPublicKeyBytes> =
            proposer_duties.iter().map(|duty| duty.pubkey).collect();
        let registrations = match self.registrations.get_registrations(&pubkeys).await {
            Ok(registrations) => registrations,
            Err(err) => {
                error!(%err, "failed to fetch validator registrations");
                return Err(err.into());
            }
        };

        if registrations.is_empty() {
            warn!("no validator registrations found for proposer duties");
        }

        let duties = format_duties(head_slot, proposer_duties, &registrations);
        let num_duties = self.slot_info.install_proposer_duties(duties)?;
        *self.proposer_duties_slot.lock().await = head_slot;

        info!(epoch_from = epoch, num_duties, "updated proposer duties");
        Ok(num_duties)
    }

    async fn should_update_duties(&self, head_slot: Slot) -> bool {
        let proposer_duties_slot = *self.proposer_duties_slot.lock().await;
        head_slot.saturating_sub(proposer_duties_slot) >= PROPOSER_DUTIES_UPDATE_FREQ
    }

    /// Duties for `epoch` and `epoch + 1`. Fails only if the current epoch cannot be fetched.
    async fn fetch_duties(&self, epoch: u64) -> Result<Vec<ProposerDuty>, BeaconClientError> {
        let (_, mut proposer_duties) = self.beacon_client.get_proposer_duties(epoch).await?;

        match self.beacon_client.get_proposer_duties(epoch + 1).await {
            Ok((_, mut next_duties)) => proposer_duties.append(&mut next_duties),
            Err(err) => error!(%err, "error fetching next proposer duties"),
        }

        Ok(proposer_duties)
    }
}

/// Upcoming duties whose proposer has a registration on file, ordered by slot.
pub fn format_duties(
    head_slot: Slot,
    proposer_duties: Vec<ProposerDuty>,
    registrations: &HashMap<BlsPublicKeyBytes, SignedValidatorRegistrationEntry>,
) -> Vec<BuilderGetValidatorsResponseEntry> {
    let mut duties: Vec<_> = proposer_duties
        .into_iter()
        .filter(|duty| duty.slot >= head_slot)
        .filter_map(|duty| {
            registrations.get(&duty.pubkey).map(|reg| BuilderGetValidatorsResponseEntry {
                slot: duty.slot,
                validator_index: duty.validator_index,
                entry: reg.registration.clone(),
            })
        })
        .collect();

    duties.sort_by_key(|duty| duty.slot);
    duties
}

fn log_beacon_error(err: &BeaconClientError, msg: &str) {
    match err {
        BeaconClientError::BeaconNodeSyncing => warn!("beacon nodes syncing, trying again later"),
        err => error!(%err, "{msg}"),
    }
}
