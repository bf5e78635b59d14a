use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use arc_swap::ArcSwap;
use helix_beacon::traits::MultiBeaconClientTrait;
use helix_types::BlsPublicKeyBytes;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::KnownValidatorsError;

/// One generation of the validator set, immutable once built.
#[derive(Debug, Default)]
pub struct KnownValidators {
    head_slot: u64,
    by_pubkey: HashMap<BlsPublicKeyBytes, u64>,
    by_index: HashMap<u64, BlsPublicKeyBytes>,
}

impl KnownValidators {
    pub fn new(
        head_slot: u64,
        validators: impl IntoIterator<Item = (BlsPublicKeyBytes, u64)>,
    ) -> Self {
        let mut by_pubkey = HashMap::new();
        let mut by_index = HashMap::new();
        for (pubkey, index) in validators {
            by_pubkey.insert(pubkey, index);
            by_index.insert(index, pubkey);
        }
        Self { head_slot, by_pubkey, by_index }
    }

    /// Slot at which this generation was fetched.
    pub fn head_slot(&self) -> u64 {
        self.head_slot
    }

    pub fn len(&self) -> usize {
        self.by_pubkey.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pubkey.is_empty()
    }

    pub fn contains(&self, pubkey: &BlsPublicKeyBytes) -> bool {
        self.by_pubkey.contains_key(pubkey)
    }

    pub fn index_of(&self, pubkey: &BlsPublicKeyBytes) -> Option<u64> {
        self.by_pubkey.get(pubkey).copied()
    }

    pub fn pubkey_at(&self, index: u64) -> Option<BlsPublicKeyBytes> {
        self.by_index.get(&index).copied()
    }
}

/// Process wide view of the active and pending validator set.
///
/// Readers load the current generation without locking; a refresh builds a new generation and
/// swaps it in whole, so a lookup never sees a mix of two refreshes.
pub struct KnownValidatorCache {
    current: ArcSwap<KnownValidators>,
    loaded: AtomicBool,
    refresh_lock: Mutex<()>,
}

impl Default for KnownValidatorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl KnownValidatorCache {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(KnownValidators::default()),
            loaded: AtomicBool::new(false),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Fetches the validator set at `head_slot` and installs it. Returns the number of validators
    /// installed. Fails with `RefreshInProgress` if another refresh is running.
    pub async fn refresh<B: MultiBeaconClientTrait + ?Sized>(
        &self,
        beacon_client: &B,
        head_slot: u64,
    ) -> Result<usize, KnownValidatorsError> {
        let _guard =
            self.refresh_lock.try_lock().map_err(|_| KnownValidatorsError::RefreshInProgress)?;

        let start = Instant::now();
        let validators = beacon_client.fetch_validators(head_slot).await?;
        let fetch_validators_latency_ms = start.elapsed().as_millis();

        let num_known_validators = self.replace(
            head_slot,
            validators.into_values().map(|summary| (summary.validator.pubkey, summary.index)),
        );

        info!(
            head_slot,
            num_known_validators,
            fetch_validators_latency_ms,
            "updated known validators"
        );

        Ok(num_known_validators)
    }

    /// Installs a new generation built from `validators`, dropping the previous one.
    pub fn replace(
        &self,
        head_slot: u64,
        validators: impl IntoIterator<Item = (BlsPublicKeyBytes, u64)>,
    ) -> usize {
        let generation = KnownValidators::new(head_slot, validators);
        let len = generation.len();
        self.current.store(Arc::new(generation));
        self.loaded.store(true, Ordering::Release);
        len
    }

    /// Current generation. Hold on to it to run several lookups against the same set.
    pub fn snapshot(&self) -> Arc<KnownValidators> {
        self.current.load_full()
    }

    /// Whether at least one generation has been installed.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn is_known(&self, pubkey: &BlsPublicKeyBytes) -> bool {
        self.current.load().contains(pubkey)
    }

    pub fn index_of(&self, pubkey: &BlsPublicKeyBytes) -> Option<u64> {
        self.current.load().index_of(pubkey)
    }

    pub fn pubkey_at(&self, index: u64) -> Option<BlsPublicKeyBytes> {
        self.current.load().pubkey_at(index)
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread, time::Duration};

    use helix_beacon::{mock_beacon_client::MockBeaconClient, MultiBeaconClient};

    use super::*;

    fn pubkey(index: u64) -> BlsPublicKeyBytes {
        MockBeaconClient::pubkey_for_index(index)
    }

    fn multi_client(client: MockBeaconClient) -> MultiBeaconClient<MockBeaconClient> {
        MultiBeaconClient::new(vec![Arc::new(client)])
    }

    #[tokio::test]
    async fn test_refresh_installs_validators() {
        let cache = KnownValidatorCache::new();
        assert!(!cache.is_loaded());
        assert!(!cache.is_known(&pubkey(1)));

        let beacon = multi_client(MockBeaconClient::new().with_state_validators(vec![
            MockBeaconClient::validator(1),
            MockBeaconClient::validator(2),
        ]));

        let installed = cache.refresh(&beacon, 100).await.unwrap();

        assert_eq!(installed, 2);
        assert!(cache.is_loaded());
        assert!(cache.is_known(&pubkey(1)));
        assert_eq!(cache.index_of(&pubkey(2)), Some(2));
        assert_eq!(cache.pubkey_at(1), Some(pubkey(1)));
        assert_eq!(cache.pubkey_at(3), None);
        assert_eq!(cache.snapshot().head_slot(), 100);
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_generation() {
        let cache = KnownValidatorCache::new();
        cache.replace(1, [(pubkey(1), 1), (pubkey(2), 2)]);

        let beacon = multi_client(
            MockBeaconClient::new().with_state_validators(vec![MockBeaconClient::validator(3)]),
        );
        cache.refresh(&beacon, 2).await.unwrap();

        assert_eq!(cache.len(), 1);
        assert!(!cache.is_known(&pubkey(1)));
        assert!(cache.is_known(&pubkey(3)));
        assert_eq!(cache.pubkey_at(2), None);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_current_generation() {
        let cache = KnownValidatorCache::new();
        cache.replace(1, [(pubkey(1), 1)]);

        let beacon = multi_client(MockBeaconClient::new().with_error());
        let err = cache.refresh(&beacon, 2).await.unwrap_err();

        assert!(matches!(err, KnownValidatorsError::BeaconClientError(_)));
        assert!(cache.is_known(&pubkey(1)));
        assert_eq!(cache.snapshot().head_slot(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_rejected() {
        let cache = KnownValidatorCache::new();
        let client = MockBeaconClient::new()
            .with_state_validators(vec![MockBeaconClient::validator(1)])
            .with_response_delay(Duration::from_millis(50));
        let beacon = multi_client(client.clone());

        let (first, second) = tokio::join!(cache.refresh(&beacon, 1), cache.refresh(&beacon, 1));

        assert_eq!(first.unwrap(), 1);
        assert!(matches!(second, Err(KnownValidatorsError::RefreshInProgress)));
        assert_eq!(client.state_validators_calls(), 1);
    }

    #[test]
    fn test_readers_see_whole_generations() {
        let cache = Arc::new(KnownValidatorCache::new());
        let generation_a: Vec<_> = (0..100).map(|i| (pubkey(i), i)).collect();
        let generation_b: Vec<_> = (100..250).map(|i| (pubkey(i), i)).collect();
        cache.replace(0, generation_a.clone());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for _ in 0..10_000 {
                        let snapshot = cache.snapshot();
                        if snapshot.contains(&pubkey(0)) {
                            assert_eq!(snapshot.len(), 100);
                            assert!(!snapshot.contains(&pubkey(100)));
                        } else {
                            assert_eq!(snapshot.len(), 150);
                            assert!(snapshot.contains(&pubkey(249)));
                        }
                    }
                })
            })
            .collect();

        for i in 0..200 {
            let generation = if i % 2 == 0 { generation_b.clone() } else { generation_a.clone() };
            cache.replace(i, generation);
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }
}
