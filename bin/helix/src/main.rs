use std::sync::Arc;

use helix_api::{start_api_service, Api};
use helix_beacon::{start_beacon_client, BeaconClient, MultiBeaconClient};
use helix_common::{
    chain_info::ChainInfo,
    utils::{init_panic_hook, init_tracing_log},
    RelayConfig,
};
use helix_database::{postgres::postgres_db_service::PostgresDatabaseService, start_db_service};
use helix_datastore::{KnownValidatorCache, LocalRegistrationStore, RedisRegistrationStore};
use helix_housekeeper::{start_housekeeper, CurrentSlotInfo};
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
use tokio::signal::unix::SignalKind;
use tracing::{error, info};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(Clone)]
struct RedisApi;

impl Api for RedisApi {
    type RegistrationStore = RedisRegistrationStore;
    type DatabaseService = PostgresDatabaseService;
}

#[derive(Clone)]
struct LocalApi;

impl Api for LocalApi {
    type RegistrationStore = LocalRegistrationStore;
    type DatabaseService = PostgresDatabaseService;
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let config = RelayConfig::load()?;
    let _guard = init_tracing_log(&config.logging)?;
    init_panic_hook();

    info!(
        network =% config.network_config,
        listen_address =% config.listen_address,
        beacon_clients = config.beacon_clients.len(),
        "starting relay"
    );

    match run(config).await {
        Ok(_) => {
            info!("relay exited");
            Ok(())
        }
        Err(err) => {
            error!(%err, "relay exited with error");
            Err(err)
        }
    }
}

async fn run(config: RelayConfig) -> eyre::Result<()> {
    let chain_info = Arc::new(config.network_config.to_chain_info()?);
    let beacon_client = start_beacon_client(&config)?;
    let db = start_db_service(&config).await?;

    match config.redis.clone() {
        Some(redis) => {
            let registrations = Arc::new(RedisRegistrationStore::new(&redis.url)?);
            info!("storing registrations in redis");
            run_relay::<RedisApi>(config, chain_info, beacon_client, db, registrations).await
        }
        None => {
            let registrations = Arc::new(LocalRegistrationStore::new());
            info!("storing registrations in memory");
            run_relay::<LocalApi>(config, chain_info, beacon_client, db, registrations).await
        }
    }
}

async fn run_relay<A: Api<DatabaseService = PostgresDatabaseService>>(
    config: RelayConfig,
    chain_info: Arc<ChainInfo>,
    beacon_client: Arc<MultiBeaconClient<BeaconClient>>,
    db: Arc<PostgresDatabaseService>,
    registrations: Arc<A::RegistrationStore>,
) -> eyre::Result<()> {
    let known_validators = Arc::new(KnownValidatorCache::new());
    let current_slot_info = CurrentSlotInfo::new();

    let _housekeeper = start_housekeeper(
        beacon_client,
        registrations.clone(),
        known_validators.clone(),
        current_slot_info.clone(),
        chain_info.clone(),
    )
    .await;

    let _api = start_api_service::<A>(
        config,
        known_validators,
        registrations,
        db,
        current_slot_info,
        chain_info,
    )?;

    // wait for SIGTERM or SIGINT
    let mut sigint = tokio::signal::unix::signal(SignalKind::interrupt())?;
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => info!("received SIGINT"),
        _ = sigterm.recv() => info!("received SIGTERM"),
    }

    Ok(())
}
