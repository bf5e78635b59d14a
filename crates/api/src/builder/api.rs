use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::IntoResponse,
};
use helix_common::utils::extract_request_id;
use helix_housekeeper::CurrentSlotInfo;
use tracing::debug;

/// Builder facing routes.
pub struct BuilderApi {
    slot_info: CurrentSlotInfo,
}

impl BuilderApi {
    pub fn new(slot_info: CurrentSlotInfo) -> Self {
        Self { slot_info }
    }

    /// Proposer duties for the current and next epoch joined with the latest registrations.
    /// Serves the table installed by the housekeeper as is, `[]` before the first install.
    ///
    /// Implements this API: <https://flashbots.github.io/relay-specs/#/Builder/getValidators>
    #[tracing::instrument(skip_all, fields(id =% extract_request_id(&headers)))]
    pub async fn get_validators(
        Extension(builder_api): Extension<Arc<BuilderApi>>,
        headers: HeaderMap,
    ) -> impl IntoResponse {
        let response = builder_api.slot_info.proposer_duties_response();
        let head_slot = builder_api.slot_info.head_slot();
        debug!(head_slot, len = response.len(), "serving duties");
        ([(CONTENT_TYPE, "application/json")], response)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;
    use axum::{body::to_bytes, http::StatusCode};
    use helix_common::api::builder_api::BuilderGetValidatorsResponseEntry;
    use helix_types::test_utils::{random_secret_key, signed_registration};

    use super::*;

    #[tokio::test]
    async fn test_get_validators_is_verbatim() {
        let slot_info = CurrentSlotInfo::default();
        let api = Arc::new(BuilderApi::new(slot_info.clone()));

        let empty = BuilderApi::get_validators(Extension(api.clone()), HeaderMap::new())
            .await
            .into_response();
        assert_eq!(empty.status(), StatusCode::OK);
        assert_eq!(to_bytes(empty.into_body(), usize::MAX).await.unwrap(), "[]");

        let registration = signed_registration(&random_secret_key(), 10, B256::ZERO);
        slot_info
            .install_proposer_duties(vec![BuilderGetValidatorsResponseEntry {
                slot: 33,
                validator_index: 4,
                entry: registration.clone(),
            }])
            .unwrap();

        let response =
            BuilderApi::get_validators(Extension(api), HeaderMap::new()).await.into_response();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, slot_info.proposer_duties_response());

        let decoded: Vec<BuilderGetValidatorsResponseEntry> =
            serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].slot, 33);
        assert_eq!(decoded[0].entry, registration);
    }
}
