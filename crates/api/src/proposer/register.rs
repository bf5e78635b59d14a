use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
};
use bytes::Bytes;
use helix_common::utils::{extract_request_id, utcnow_sec};
use helix_datastore::KnownValidators;
use helix_types::SignedValidatorRegistration;
use tracing::{debug, info, warn};

use super::{api::ProposerApi, error::ProposerApiError};

/// How far ahead of the local clock a registration timestamp may be.
pub const MAX_TIMESTAMP_DRIFT_SECS: u64 = 10;

impl ProposerApi {
    /// Implements this API: <https://ethereum.github.io/builder-specs/#/Builder/registerValidator>
    ///
    /// Membership and freshness are checked here, entries passing both are queued for signature
    /// verification and storage. Returns once queued, not once stored.
    #[tracing::instrument(skip_all, fields(id =% extract_request_id(&headers)))]
    pub async fn register_validators(
        Extension(proposer_api): Extension<Arc<ProposerApi>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<StatusCode, ProposerApiError> {
        let registrations: Vec<SignedValidatorRegistration> = serde_json::from_slice(&body)?;
        if registrations.is_empty() {
            return Err(ProposerApiError::EmptyRequest);
        }

        let num_registrations = registrations.len();
        let known = proposer_api.known_validators.snapshot();
        let max_timestamp = utcnow_sec() + MAX_TIMESTAMP_DRIFT_SECS;

        let mut first_failure = None;
        let mut num_queued = 0;
        for registration in registrations {
            if let Err(err) = check_registration(&registration, &known, max_timestamp) {
                debug!(pubkey = %registration.pubkey(), %err, "rejected registration");
                first_failure.get_or_insert(err);
                continue;
            }

            proposer_api.intake.submit(registration)?;
            num_queued += 1;
        }

        info!(
            num_registrations,
            num_queued,
            queue_len = proposer_api.intake.queued(),
            "registrations queued"
        );

        match first_failure {
            Some(err) => {
                let num_rejected = num_registrations - num_queued;
                warn!(%err, num_rejected, "some registrations rejected");
                Err(err)
            }
            None => Ok(StatusCode::OK),
        }
    }
}

/// Checks that can be judged without touching the signature.
pub(crate) fn check_registration(
    registration: &SignedValidatorRegistration,
    known: &KnownValidators,
    max_timestamp: u64,
) -> Result<(), ProposerApiError> {
    if !known.contains(&registration.pubkey()) {
        return Err(ProposerApiError::UnknownValidator);
    }

    if registration.timestamp() > max_timestamp {
        return Err(ProposerApiError::TimestampTooFarInTheFuture);
    }

    Ok(())
}
