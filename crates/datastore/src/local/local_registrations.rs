use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use helix_common::SignedValidatorRegistrationEntry;
use helix_types::BlsPublicKeyBytes;

use crate::{error::RegistrationStoreError, traits::RegistrationStore};

/// In-process registration store. Each write holds only the shard lock of its own key.
#[derive(Default)]
pub struct LocalRegistrationStore {
    registrations: DashMap<BlsPublicKeyBytes, SignedValidatorRegistrationEntry>,
}

impl LocalRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    fn save_if_newer_sync(&self, entry: SignedValidatorRegistrationEntry) -> bool {
        match self.registrations.entry(entry.pubkey()) {
            Entry::Occupied(mut current) => {
                if current.get().timestamp() >= entry.timestamp() {
                    return false;
                }
                current.insert(entry);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }
}

#[async_trait]
impl RegistrationStore for LocalRegistrationStore {
    async fn save_if_newer(
        &self,
        entry: SignedValidatorRegistrationEntry,
    ) -> Result<bool, RegistrationStoreError> {
        Ok(self.save_if_newer_sync(entry))
    }

    async fn get_registration(
        &self,
        pubkey: &BlsPublicKeyBytes,
    ) -> Result<Option<SignedValidatorRegistrationEntry>, RegistrationStoreError> {
        Ok(self.registrations.get(pubkey).map(|entry| entry.value().clone()))
    }

    async fn get_registrations(
        &self,
        pubkeys: &[BlsPublicKeyBytes],
    ) -> Result<
        HashMap<BlsPublicKeyBytes, SignedValidatorRegistrationEntry>,
        RegistrationStoreError,
    > {
        Ok(pubkeys
            .iter()
            .filter_map(|pubkey| {
                self.registrations.get(pubkey).map(|entry| (*pubkey, entry.value().clone()))
            })
            .collect())
    }
}
