use helix_beacon::error::BeaconClientError;

use crate::redis::error::RedisCacheError;

#[derive(Debug, thiserror::Error)]
pub enum KnownValidatorsError {
    #[error("known validators refresh already in progress")]
    RefreshInProgress,

    #[error("beacon client error: {0}")]
    BeaconClientError(#[from] BeaconClientError),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationStoreError {
    #[error("redis error: {0}")]
    RedisError(#[from] RedisCacheError),
}
