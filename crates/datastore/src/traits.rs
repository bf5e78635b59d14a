use std::collections::HashMap;

use async_trait::async_trait;
use helix_common::SignedValidatorRegistrationEntry;
use helix_types::BlsPublicKeyBytes;

use crate::error::RegistrationStoreError;

/// Latest accepted registration per validator.
///
/// Implementations resolve concurrent writes per key: a write only lands if its timestamp is
/// strictly greater than the stored one, so the outcome does not depend on arrival order.
#[async_trait]
#[auto_impl::auto_impl(Arc)]
pub trait RegistrationStore: Send + Sync + 'static {
    /// Stores `entry` unless a registration with an equal or newer timestamp is already on file.
    /// Returns whether the entry was stored.
    async fn save_if_newer(
        &self,
        entry: SignedValidatorRegistrationEntry,
    ) -> Result<bool, RegistrationStoreError>;

    async fn get_registration(
        &self,
        pubkey: &BlsPublicKeyBytes,
    ) -> Result<Option<SignedValidatorRegistrationEntry>, RegistrationStoreError>;

    /// Registrations for the given validators, missing ones are skipped.
    async fn get_registrations(
        &self,
        pubkeys: &[BlsPublicKeyBytes],
    ) -> Result<
        HashMap<BlsPublicKeyBytes, SignedValidatorRegistrationEntry>,
        RegistrationStoreError,
    >;
}
