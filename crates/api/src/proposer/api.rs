use std::sync::Arc;

use axum::http::StatusCode;
use helix_datastore::KnownValidatorCache;

use crate::intake::RegistrationHandle;

/// Proposer facing routes of the builder API.
pub struct ProposerApi {
    pub(crate) known_validators: Arc<KnownValidatorCache>,
    pub(crate) intake: RegistrationHandle,
}

impl ProposerApi {
    pub fn new(known_validators: Arc<KnownValidatorCache>, intake: RegistrationHandle) -> Self {
        Self { known_validators, intake }
    }

    /// Implements this API: <https://ethereum.github.io/builder-specs/#/Builder/status>
    ///
    /// Healthy as long as the server is up, regardless of the beacon nodes' sync state.
    pub async fn status() -> StatusCode {
        StatusCode::OK
    }
}
