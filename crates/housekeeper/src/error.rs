use helix_beacon::error::BeaconClientError;
use helix_datastore::error::{KnownValidatorsError, RegistrationStoreError};
use thiserror::Error;
use tokio::sync::TryLockError;

#[derive(Debug, Error)]
pub enum HousekeeperError {
    #[error("beacon client error. {0}")]
    BeaconClientError(#[from] BeaconClientError),

    #[error("known validators error. {0}")]
    KnownValidatorsError(#[from] KnownValidatorsError),

    #[error("registration store error. {0}")]
    RegistrationStoreError(#[from] RegistrationStoreError),

    #[error("serde json error. {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("update already in progress")]
    UpdateInProgress(#[from] TryLockError),

    #[error("head event channel closed")]
    HeadEventChannelClosed,
}
