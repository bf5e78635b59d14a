use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use alloy_primitives::B256;
use async_trait::async_trait;
use helix_common::{ProposerDuty, ValidatorSummary};
use helix_types::BlsPublicKeyBytes;
use tokio::sync::broadcast::Sender;
use tracing::{debug, warn};

use crate::{
    error::BeaconClientError,
    traits::{BeaconClientTrait, MultiBeaconClientTrait},
    types::{HeadEventData, SyncStatus},
};

#[derive(Clone)]
pub struct MultiBeaconClient<BeaconClient: BeaconClientTrait + 'static> {
    /// Vec of all beacon clients with a fixed usize ID used when
    /// fetching: `beacon_clients_by_last_response`
    pub beacon_clients: Vec<(usize, Arc<BeaconClient>)>,
    /// The ID of the beacon client with the most recent successful response.
    pub best_beacon_instance: Arc<AtomicUsize>,
}

impl<BeaconClient: BeaconClientTrait> MultiBeaconClient<BeaconClient> {
    pub fn new(beacon_clients: Vec<Arc<BeaconClient>>) -> Self {
        let beacon_clients_with_index = beacon_clients.into_iter().enumerate().collect();

        Self {
            beacon_clients: beacon_clients_with_index,
            best_beacon_instance: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a list of beacon clients, prioritized by the last successful response.
    ///
    /// The beacon client with the most recent successful response is placed at the
    /// beginning of the returned vector. All other clients maintain their original order.
    pub fn beacon_clients_by_last_response(&self) -> Vec<(usize, Arc<BeaconClient>)> {
        let mut instances = self.beacon_clients.clone();
        let index = self.best_beacon_instance.load(Ordering::Relaxed);
        if index != 0 {
            if let Some(pos) = instances.iter().position(|(i, _)| *i == index) {
                instances.swap(0, pos);
            }
        }
        instances
    }
}

#[async_trait]
impl<BeaconClient: BeaconClientTrait> MultiBeaconClientTrait for MultiBeaconClient<BeaconClient> {
    /// Queries every beacon client concurrently and returns the first response from a node that
    /// is not syncing.
    ///
    /// Responses are handled in arrival order. Errors are skipped and syncing nodes are only kept
    /// as a fallback for logging. Once a winner is found the remaining requests are abandoned;
    /// the channel has room for every client so their tasks finish without blocking.
    async fn best_sync_status(&self) -> Result<SyncStatus, BeaconClientError> {
        let clients = self.beacon_clients_by_last_response();
        let num_clients = clients.len();
        let (sender, mut receiver) = tokio::sync::mpsc::channel(num_clients.max(1));

        for (i, client) in clients {
            let sender = sender.clone();
            tokio::spawn(async move {
                let res = client.sync_status().await;
                // fails once a winner has been picked and the receiver is gone
                let _ = sender.send((i, client.get_uri(), res)).await;
            });
        }
        drop(sender);

        let mut syncing_fallback: Option<SyncStatus> = None;
        while let Some((i, uri, res)) = receiver.recv().await {
            match res {
                Ok(sync_status) if !sync_status.is_syncing => {
                    self.best_beacon_instance.store(i, Ordering::Relaxed);
                    return Ok(sync_status);
                }
                Ok(sync_status) => {
                    debug!(uri, head_slot = sync_status.head_slot, "beacon node is syncing");
                    if syncing_fallback.as_ref().is_none_or(|s| s.head_slot < sync_status.head_slot)
                    {
                        syncing_fallback = Some(sync_status);
                    }
                }
                Err(err) => warn!(uri, %err, "failed to get sync status"),
            }
        }

        if let Some(fallback) = syncing_fallback {
            warn!(
                head_slot = fallback.head_slot,
                sync_distance = fallback.sync_distance,
                "all responding beacon nodes are syncing"
            );
        }

        Err(BeaconClientError::BeaconNodeSyncing)
    }

    /// `subscribe_to_head_events` subscribes to head events from all beacon nodes.
    ///
    /// This function spawns async tasks for all beacon clients. Therefore,
    /// a single head event will be received multiple times, likely once for every beacon node.
    async fn subscribe_to_head_events(&self, chan: Sender<HeadEventData>) {
        let clients = self.beacon_clients_by_last_response();

        for (_, client) in clients {
            let chan = chan.clone();
            tokio::spawn(async move {
                if let Err(err) = client.subscribe_to_head_events(chan).await {
                    warn!(uri = client.get_uri(), %err, "head event subscription ended");
                }
            });
        }
    }

    async fn fetch_validators(
        &self,
        head_slot: u64,
    ) -> Result<HashMap<BlsPublicKeyBytes, ValidatorSummary>, BeaconClientError> {
        let clients = self.beacon_clients_by_last_response();
        let mut last_error = None;

        for (i, client) in clients.into_iter() {
            match client.fetch_validators(head_slot).await {
                Ok(validators) => {
                    self.best_beacon_instance.store(i, Ordering::Relaxed);
                    return Ok(validators);
                }
                Err(err) => {
                    warn!(uri = client.get_uri(), %err, "failed to fetch validators");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(BeaconClientError::BeaconNodeUnavailable))
    }

    async fn get_proposer_duties(
        &self,
        epoch: u64,
    ) -> Result<(B256, Vec<ProposerDuty>), BeaconClientError> {
        let clients = self.beacon_clients_by_last_response();
        let mut last_error = None;

        for (i, client) in clients.into_iter() {
            match client.get_proposer_duties(epoch).await {
                Ok(proposer_duties) => {
                    self.best_beacon_instance.store(i, Ordering::Relaxed);
                    return Ok(proposer_duties);
                }
                Err(err) => {
                    warn!(uri = client.get_uri(), %err, epoch, "failed to get proposer duties");
                    last_error = Some(err);
                }
            }
        }

        Err(last_error.unwrap_or(BeaconClientError::BeaconNodeUnavailable))
    }
}

#[cfg(test)]
mod multi_beacon_client_tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::mock_beacon_client::MockBeaconClient;

    fn status(head_slot: u64, is_syncing: bool) -> SyncStatus {
        SyncStatus { head_slot, sync_distance: 0, is_syncing }
    }

    fn delayed(head_slot: u64, is_syncing: bool, delay_ms: u64) -> Arc<MockBeaconClient> {
        Arc::new(
            MockBeaconClient::new()
                .with_sync_status(status(head_slot, is_syncing))
                .with_response_delay(Duration::from_millis(delay_ms)),
        )
    }

    #[tokio::test]
    async fn test_beacon_clients_by_last_response() {
        let client1 = Arc::new(MockBeaconClient::new());
        let client2 = Arc::new(MockBeaconClient::new());
        let client3 = Arc::new(MockBeaconClient::new());
        let client4 = Arc::new(MockBeaconClient::new());
        let multi_client = MultiBeaconClient::new(vec![client1, client2, client3, client4]);

        multi_client.best_beacon_instance.store(2, Ordering::Relaxed);
        let clients = multi_client.beacon_clients_by_last_response();

        assert_eq!(clients[0].0, multi_client.beacon_clients[2].0);
        assert_eq!(clients[1].0, multi_client.beacon_clients[1].0);
        assert_eq!(clients[2].0, multi_client.beacon_clients[0].0);
        assert_eq!(clients[3].0, multi_client.beacon_clients[3].0);
    }

    #[tokio::test]
    async fn test_best_sync_status_first_non_syncing_wins() {
        // client i answers after i*10ms
        let multi_client = MultiBeaconClient::new(vec![
            delayed(1, true, 0),
            delayed(2, false, 10),
            delayed(3, false, 20),
        ]);

        let best_status = multi_client.best_sync_status().await.unwrap();

        assert_eq!(best_status.head_slot, 2);
        assert_eq!(multi_client.best_beacon_instance.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_best_sync_status_ignores_configuration_order() {
        let multi_client = MultiBeaconClient::new(vec![
            delayed(1, false, 50),
            delayed(2, false, 5),
            delayed(3, true, 0),
        ]);

        let best_status = multi_client.best_sync_status().await.unwrap();
        assert_eq!(best_status.head_slot, 2);
    }

    #[tokio::test]
    async fn test_best_sync_status_skips_errors() {
        let failing = Arc::new(MockBeaconClient::new().with_error());
        let multi_client =
            MultiBeaconClient::new(vec![failing.clone(), delayed(5, false, 10), failing]);

        let best_status = multi_client.best_sync_status().await.unwrap();
        assert_eq!(best_status.head_slot, 5);
    }

    #[tokio::test]
    async fn test_best_sync_status_all_syncing() {
        let multi_client =
            MultiBeaconClient::new(vec![delayed(1, true, 0), delayed(2, true, 10)]);

        let err = multi_client.best_sync_status().await.unwrap_err();
        assert!(matches!(err, BeaconClientError::BeaconNodeSyncing));
    }

    #[tokio::test]
    async fn test_best_sync_status_all_errors() {
        let multi_client = MultiBeaconClient::new(vec![
            Arc::new(MockBeaconClient::new().with_error()),
            Arc::new(MockBeaconClient::new().with_error()),
        ]);

        let err = multi_client.best_sync_status().await.unwrap_err();
        assert!(matches!(err, BeaconClientError::BeaconNodeSyncing));
    }

    #[tokio::test]
    async fn test_best_sync_status_no_clients() {
        let multi_client = MultiBeaconClient::<MockBeaconClient>::new(vec![]);
        assert!(matches!(
            multi_client.best_sync_status().await,
            Err(BeaconClientError::BeaconNodeSyncing)
        ));
    }

    #[tokio::test]
    async fn test_best_sync_status_does_not_wait_for_slow_nodes() {
        let multi_client =
            MultiBeaconClient::new(vec![delayed(1, false, 10_000), delayed(2, false, 10)]);

        let start = Instant::now();
        let best_status = multi_client.best_sync_status().await.unwrap();

        assert_eq!(best_status.head_slot, 2);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_fetch_validators_falls_back() {
        let failing = Arc::new(MockBeaconClient::new().with_error());
        let healthy = Arc::new(
            MockBeaconClient::new().with_state_validators(vec![MockBeaconClient::validator(7)]),
        );
        let multi_client = MultiBeaconClient::new(vec![failing, healthy]);

        let validators = multi_client.fetch_validators(10).await.unwrap();

        assert_eq!(validators.len(), 1);
        assert_eq!(multi_client.best_beacon_instance.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_get_proposer_duties_all_failing() {
        let multi_client = MultiBeaconClient::new(vec![
            Arc::new(MockBeaconClient::new().with_error()),
            Arc::new(MockBeaconClient::new().with_error()),
        ]);

        let err = multi_client.get_proposer_duties(1).await.unwrap_err();
        assert!(matches!(err, BeaconClientError::BeaconNodeUnavailable));
    }
}
