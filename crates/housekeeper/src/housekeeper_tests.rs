use std::{sync::Arc, time::Duration};

use alloy_primitives::B256;
use helix_beacon::{
    mock_beacon_client::MockBeaconClient,
    types::{HeadEventData, SyncStatus},
    MultiBeaconClient,
};
use helix_common::{chain_info::ChainInfo, ProposerDuty, SignedValidatorRegistrationEntry};
use helix_datastore::{KnownValidatorCache, LocalRegistrationStore, RegistrationStore};
use helix_types::{
    pubkey_bytes,
    test_utils::{random_secret_key, signed_registration},
    BlsPublicKeyBytes,
};

use crate::{error::HousekeeperError, start_housekeeper, CurrentSlotInfo, Housekeeper};

type TestHousekeeper =
    Housekeeper<Arc<MultiBeaconClient<MockBeaconClient>>, Arc<LocalRegistrationStore>>;

struct HelperVars {
    housekeeper: Arc<TestHousekeeper>,
    registrations: Arc<LocalRegistrationStore>,
    known_validators: Arc<KnownValidatorCache>,
    slot_info: CurrentSlotInfo,
}

fn get_housekeeper(client: MockBeaconClient) -> HelperVars {
    let beacon_client = Arc::new(MultiBeaconClient::new(vec![Arc::new(client)]));
    let registrations = Arc::new(LocalRegistrationStore::new());
    let known_validators = Arc::new(KnownValidatorCache::new());
    let slot_info = CurrentSlotInfo::new();

    let housekeeper = Arc::new(Housekeeper::with_validator_refresh_delay(
        beacon_client,
        registrations.clone(),
        known_validators.clone(),
        slot_info.clone(),
        Arc::new(ChainInfo::for_mainnet()),
        Duration::ZERO,
    ));

    HelperVars { housekeeper, registrations, known_validators, slot_info }
}

fn registration() -> (BlsPublicKeyBytes, SignedValidatorRegistrationEntry) {
    let sk = random_secret_key();
    let registration = signed_registration(&sk, 1_000, B256::ZERO);
    (pubkey_bytes(&sk.public_key()), SignedValidatorRegistrationEntry::new(registration))
}

fn duty(pubkey: BlsPublicKeyBytes, validator_index: u64, slot: u64) -> ProposerDuty {
    ProposerDuty { pubkey, validator_index, slot }
}

#[tokio::test]
async fn test_proposer_duties_joined_with_registrations() {
    let (registered_a, entry_a) = registration();
    let (registered_b, entry_b) = registration();
    let unregistered = MockBeaconClient::pubkey_for_index(99);

    let duties = vec![
        duty(registered_b, 2, 70),
        duty(registered_a, 1, 33),
        duty(unregistered, 99, 34),
        duty(registered_a, 1, 32),
    ];
    let vars = get_housekeeper(MockBeaconClient::new().with_proposer_duties((B256::ZERO, duties)));
    for entry in [entry_a, entry_b] {
        assert!(vars.registrations.save_if_newer(entry).await.unwrap());
    }

    // head at slot 33 of epoch 1, duties of epoch 2 are fetched too
    let num_duties = vars.housekeeper.update_proposer_duties(33).await.unwrap();

    assert_eq!(num_duties, 2);
    let installed = vars.slot_info.proposer_duties();
    let slots: Vec<_> = installed.entries.iter().map(|d| d.slot).collect();
    assert_eq!(slots, vec![33, 70]);
    assert_eq!(installed.entries[1].validator_index, 2);
    assert_eq!(installed.entries[1].entry.pubkey(), registered_b);

    let expected = serde_json::to_vec(&installed.entries).unwrap();
    assert_eq!(&vars.slot_info.proposer_duties_response()[..], &expected[..]);
}

#[tokio::test]
async fn test_failed_duties_fetch_keeps_table() {
    let vars = get_housekeeper(MockBeaconClient::new().with_error());
    vars.slot_info.install_proposer_duties(vec![]).unwrap();

    let err = vars.housekeeper.update_proposer_duties(40).await.unwrap_err();

    assert!(matches!(err, HousekeeperError::BeaconClientError(_)));
    assert_eq!(&vars.slot_info.proposer_duties_response()[..], b"[]");
}

#[tokio::test]
async fn test_overlapping_duties_update_is_rejected() {
    let client = MockBeaconClient::new().with_response_delay(Duration::from_millis(50));
    let vars = get_housekeeper(client);

    let (first, second) = tokio::join!(
        vars.housekeeper.update_proposer_duties(32),
        vars.housekeeper.update_proposer_duties(32)
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(HousekeeperError::UpdateInProgress(_))));
}

#[tokio::test]
async fn test_known_validators_refresh_schedule() {
    let client =
        MockBeaconClient::new().with_state_validators(vec![MockBeaconClient::validator(1)]);
    let vars = get_housekeeper(client);

    assert!(vars.housekeeper.should_refresh_known_validators(10).await);
    assert_eq!(vars.housekeeper.refresh_known_validators(10).await.unwrap(), 1);
    assert!(vars.known_validators.is_known(&MockBeaconClient::pubkey_for_index(1)));

    // too soon
    assert!(!vars.housekeeper.should_refresh_known_validators(12).await);
    // slot 35 is position 4 of epoch 1
    assert!(vars.housekeeper.should_refresh_known_validators(35).await);
    // position 5, no forced update yet
    assert!(!vars.housekeeper.should_refresh_known_validators(36).await);
    // more than 32 slots since the last refresh
    assert!(vars.housekeeper.should_refresh_known_validators(43).await);
}

#[tokio::test]
async fn test_syncing_nodes_leave_head_untouched() {
    let client = MockBeaconClient::new().with_sync_status(SyncStatus {
        head_slot: 100,
        sync_distance: 50,
        is_syncing: true,
    });
    let vars = get_housekeeper(client);

    vars.housekeeper.poll_sync_status().await;

    assert_eq!(vars.slot_info.head_slot(), 0);
    assert!(!vars.known_validators.is_loaded());
}

#[tokio::test]
async fn test_head_events_drive_updates() {
    let store = Arc::new(LocalRegistrationStore::new());
    let (registered, entry) = registration();
    store.save_if_newer(entry).await.unwrap();

    let client = MockBeaconClient::new()
        .with_state_validators(vec![MockBeaconClient::validator_with_pubkey(7, registered)])
        .with_proposer_duties((B256::ZERO, vec![duty(registered, 7, 45)]))
        .with_head_events(vec![HeadEventData { slot: 40, ..Default::default() }]);
    let beacon_client = Arc::new(MultiBeaconClient::new(vec![Arc::new(client)]));
    let known_validators = Arc::new(KnownValidatorCache::new());
    let slot_info = CurrentSlotInfo::new();

    start_housekeeper(
        beacon_client,
        store,
        known_validators.clone(),
        slot_info.clone(),
        Arc::new(ChainInfo::for_mainnet()),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(slot_info.head_slot(), 40);
    assert_eq!(known_validators.index_of(&registered), Some(7));
    let installed = slot_info.proposer_duties();
    assert_eq!(installed.entries.len(), 1);
    assert_eq!(installed.entries[0].slot, 45);
}
