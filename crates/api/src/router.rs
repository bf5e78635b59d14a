use std::sync::Arc;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    Extension, Router,
};
use helix_common::{Route, RouterConfig};
use tower::{timeout::TimeoutLayer, BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::{
    builder::BuilderApi,
    proposer::ProposerApi,
    relay_data::{DataApi, DeliveredPayloadsCache},
    service::API_REQUEST_TIMEOUT,
    Api,
};

/// Large enough for a registration batch covering a big operator's validators.
pub const MAX_PAYLOAD_LENGTH: usize = 1024 * 1024 * 16;

pub fn build_router<A: Api>(
    router_config: &mut RouterConfig,
    builder_api: Arc<BuilderApi>,
    proposer_api: Arc<ProposerApi>,
    data_api: Arc<DataApi<A>>,
    delivered_payloads_cache: Arc<DeliveredPayloadsCache>,
) -> Router {
    router_config.resolve_condensed_routes();

    let mut router = Router::new();

    for route in router_config.enabled_routes.iter().copied() {
        let Some(path) = route.path() else {
            warn!(?route, "skipping unresolved condensed route");
            continue;
        };

        router = match route {
            Route::GetValidators => router.route(&path, get(BuilderApi::get_validators)),
            Route::Status => router.route(&path, get(ProposerApi::status)),
            Route::RegisterValidators => {
                router.route(&path, post(ProposerApi::register_validators))
            }
            Route::ProposerPayloadDelivered => {
                router.route(&path, get(DataApi::<A>::proposer_payload_delivered))
            }
            Route::ValidatorRegistration => {
                router.route(&path, get(DataApi::<A>::validator_registration))
            }
            Route::All | Route::BuilderApi | Route::ProposerApi | Route::DataApi => router,
        };
    }

    // Add payload size limit
    router = router.layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_LENGTH));

    // Add Timeout-Layer
    // Add Error-handling layer
    router = router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(|_: BoxError| async { StatusCode::REQUEST_TIMEOUT }))
            .layer(TimeoutLayer::new(API_REQUEST_TIMEOUT)),
    );

    // Add Extension layers
    router
        .layer(Extension(builder_api))
        .layer(Extension(proposer_api))
        .layer(Extension(data_api))
        .layer(Extension(delivered_payloads_cache))
}
