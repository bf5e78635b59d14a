#![allow(clippy::too_many_arguments)]

use std::sync::Arc;

use helix_common::{chain_info::ChainInfo, RelayConfig};
use helix_database::DatabaseService;
use helix_datastore::{KnownValidatorCache, RegistrationStore};
use helix_housekeeper::CurrentSlotInfo;
use tracing::info;

pub mod builder;
pub mod intake;
pub mod proposer;
pub mod relay_data;
pub mod router;
pub mod service;

#[cfg(test)]
pub mod test_utils;

use crate::{
    builder::BuilderApi,
    intake::start_registration_intake,
    proposer::ProposerApi,
    relay_data::{api::delivered_payloads_cache, DataApi},
    router::build_router,
    service::{ApiService, ApiServiceError},
};

pub trait Api: Clone + Send + Sync + 'static {
    type RegistrationStore: RegistrationStore;
    type DatabaseService: DatabaseService;
}

/// Starts the registration workers and the HTTP server. Must be called from within a tokio
/// runtime, workers use its handle for store I/O.
pub fn start_api_service<A: Api>(
    mut config: RelayConfig,
    known_validators: Arc<KnownValidatorCache>,
    registrations: Arc<A::RegistrationStore>,
    db: Arc<A::DatabaseService>,
    current_slot_info: CurrentSlotInfo,
    chain_info: Arc<ChainInfo>,
) -> Result<Arc<ApiService>, ApiServiceError> {
    let runtime = tokio::runtime::Handle::try_current()?;

    let intake = start_registration_intake(
        config.registrations.queue_capacity,
        config.registrations.workers,
        registrations.clone(),
        chain_info.builder_domain,
        runtime,
    )?;
    info!(
        workers = config.registrations.workers,
        queue_capacity = config.registrations.queue_capacity,
        "started registration intake"
    );

    let builder_api = Arc::new(BuilderApi::new(current_slot_info));
    let proposer_api = Arc::new(ProposerApi::new(known_validators, intake));
    let data_api = Arc::new(DataApi::<A>::new(db, registrations));

    let router = build_router::<A>(
        &mut config.router_config,
        builder_api,
        proposer_api,
        data_api,
        Arc::new(delivered_payloads_cache()),
    );

    let service = Arc::new(ApiService::new(config.listen_address, router));
    service.start()?;

    Ok(service)
}
