use std::sync::Arc;

use helix_common::RelayConfig;

pub mod beacon_client;
pub mod error;
pub mod mock_beacon_client;
pub mod multi_beacon_client;
pub mod traits;
pub mod types;

pub use beacon_client::BeaconClient;
pub use multi_beacon_client::MultiBeaconClient;

use crate::error::BeaconClientError;

pub fn start_beacon_client(
    config: &RelayConfig,
) -> Result<Arc<MultiBeaconClient<BeaconClient>>, BeaconClientError> {
    let beacon_clients = config
        .beacon_clients
        .iter()
        .map(|cfg| BeaconClient::from_endpoint_str(&cfg.url).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Arc::new(MultiBeaconClient::new(beacon_clients)))
}
