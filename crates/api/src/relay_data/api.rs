use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use helix_common::{
    api::data_api::{
        BidFilters, DeliveredPayloadsResponse, ProposerPayloadDeliveredParams,
        ValidatorRegistrationParams,
    },
    utils::extract_request_id,
};
use helix_database::DatabaseService;
use helix_datastore::RegistrationStore;
use moka::sync::Cache;
use tracing::warn;

use crate::{relay_data::error::DataApiError, Api};

pub type DeliveredPayloadsCache = Cache<String, Vec<DeliveredPayloadsResponse>>;

const MAX_LIMIT: u64 = 500;

/// Builds the short lived cache for delivered payload queries.
pub fn delivered_payloads_cache() -> DeliveredPayloadsCache {
    Cache::builder()
        .time_to_live(Duration::from_secs(10))
        .time_to_idle(Duration::from_secs(5))
        .build()
}

pub struct DataApi<A: Api> {
    db: Arc<A::DatabaseService>,
    registrations: Arc<A::RegistrationStore>,
}

impl<A: Api> DataApi<A> {
    pub fn new(db: Arc<A::DatabaseService>, registrations: Arc<A::RegistrationStore>) -> Self {
        Self { db, registrations }
    }

    /// Implements this API: <https://flashbots.github.io/relay-specs/#/Data/getDeliveredPayloads>
    #[tracing::instrument(skip_all, fields(id =% extract_request_id(&headers)))]
    pub async fn proposer_payload_delivered(
        Extension(data_api): Extension<Arc<DataApi<A>>>,
        Extension(cache): Extension<Arc<DeliveredPayloadsCache>>,
        headers: HeaderMap,
        Query(params): Query<ProposerPayloadDeliveredParams>,
    ) -> Result<impl IntoResponse, DataApiError> {
        let filters = BidFilters::try_from(params)?;

        if filters.slot.is_some() && filters.cursor.is_some() {
            return Err(DataApiError::SlotAndCursor);
        }

        if filters.limit.is_some_and(|limit| limit > MAX_LIMIT) {
            return Err(DataApiError::LimitReached);
        }

        let cache_key = format!("{filters:?}");

        if let Some(cached_result) = cache.get(&cache_key) {
            return Ok(Json(cached_result));
        }

        match data_api.db.get_delivered_payloads(&filters).await {
            Ok(result) => {
                let response =
                    result.into_iter().map(Into::into).collect::<Vec<DeliveredPayloadsResponse>>();

                cache.insert(cache_key, response.clone());

                Ok(Json(response))
            }
            Err(err) => {
                warn!(error=%err, "failed to fetch delivered payloads");
                Err(DataApiError::InternalServerError)
            }
        }
    }

    /// Implements this API: <https://flashbots.github.io/relay-specs/#/Data/getValidatorRegistration>
    #[tracing::instrument(skip_all, fields(id =% extract_request_id(&headers)))]
    pub async fn validator_registration(
        Extension(data_api): Extension<Arc<DataApi<A>>>,
        headers: HeaderMap,
        Query(params): Query<ValidatorRegistrationParams>,
    ) -> Result<impl IntoResponse, DataApiError> {
        match data_api.registrations.get_registration(&params.pubkey).await {
            Ok(Some(entry)) => Ok(Json(entry.registration)),
            Ok(None) => Err(DataApiError::RegistrationNotFound),
            Err(err) => {
                warn!(error=%err, "failed to get validator registration");
                Err(DataApiError::InternalServerError)
            }
        }
    }
}
