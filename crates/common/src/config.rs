use std::{collections::HashSet, fs::File, net::SocketAddr, path::PathBuf};

use alloy_primitives::B256;
use clap::Parser;
use lh_types::{ChainSpec, Config, MainnetEthSpec};
use serde::{Deserialize, Serialize};

use crate::{api::*, chain_info::ChainInfo};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("chain spec in {0} is incompatible with the mainnet preset")]
    IncompatibleChainSpec(PathBuf),
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RelayConfig {
    pub postgres: PostgresConfig,
    /// Registrations are kept in process memory when unset.
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    #[serde(default)]
    pub beacon_clients: Vec<BeaconClientConfig>,
    #[serde(default)]
    pub network_config: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub router_config: RouterConfig,
    #[serde(default)]
    pub registrations: RegistrationIntakeConfig,
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
}

impl RelayConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let start_config = StartConfig::parse();
        Self::from_file(&start_config.config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: RelayConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PostgresConfig {
    pub hostname: String,
    #[serde(default = "default_postgres_port")]
    pub port: u16,
    pub db_name: String,
    pub user: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BeaconClientConfig {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub enum NetworkConfig {
    #[default]
    Mainnet,
    Sepolia,
    Holesky,
    Hoodi,
    Custom {
        /// Directory holding the network's `config.yaml`.
        dir_path: String,
        genesis_validator_root: B256,
        genesis_time: u64,
    },
}

impl NetworkConfig {
    pub fn to_chain_info(&self) -> Result<ChainInfo, ConfigError> {
        let chain_info = match self {
            NetworkConfig::Mainnet => ChainInfo::for_mainnet(),
            NetworkConfig::Sepolia => ChainInfo::for_sepolia(),
            NetworkConfig::Holesky => ChainInfo::for_holesky(),
            NetworkConfig::Hoodi => ChainInfo::for_hoodi(),
            NetworkConfig::Custom { dir_path, genesis_validator_root, genesis_time } => {
                let path = PathBuf::from(dir_path).join("config.yaml");
                let config: Config = serde_yaml::from_reader(File::open(&path)?)?;
                let spec = ChainSpec::from_config::<MainnetEthSpec>(&config)
                    .ok_or(ConfigError::IncompatibleChainSpec(path))?;
                ChainInfo::new(spec, *genesis_validator_root, *genesis_time)
            }
        };

        Ok(chain_info)
    }
}

impl std::fmt::Display for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkConfig::Mainnet => write!(f, "mainnet"),
            NetworkConfig::Sepolia => write!(f, "sepolia"),
            NetworkConfig::Holesky => write!(f, "holesky"),
            NetworkConfig::Hoodi => write!(f, "hoodi"),
            NetworkConfig::Custom { dir_path, .. } => write!(f, "custom ({dir_path})"),
        }
    }
}

#[derive(Default, Serialize, Deserialize, Clone, Debug)]
pub enum LoggingConfig {
    #[default]
    Console,
    File {
        dir_path: String,
        file_name: String,
    },
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct RegistrationIntakeConfig {
    /// Number of threads verifying and storing registrations.
    #[serde(default = "default_intake_workers")]
    pub workers: usize,
    /// Registrations waiting for a worker; submissions beyond this are rejected.
    #[serde(default = "default_intake_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for RegistrationIntakeConfig {
    fn default() -> Self {
        Self { workers: default_intake_workers(), queue_capacity: default_intake_queue_capacity() }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
#[clap(name = "helix")]
pub struct StartConfig {
    #[clap(long, default_value = "config.yml")]
    pub config: String,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub enabled_routes: HashSet<Route>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { enabled_routes: [Route::All].into_iter().collect() }
    }
}

impl RouterConfig {
    // Function to resolve condensed variants and replace them with real routes
    pub fn resolve_condensed_routes(&mut self) {
        if self.enabled_routes.contains(&Route::All) {
            self.enabled_routes.remove(&Route::All);
            self.enabled_routes.extend([Route::BuilderApi, Route::ProposerApi, Route::DataApi]);
        }

        self.replace_condensed_with_real(Route::BuilderApi, &[Route::GetValidators]);

        self.replace_condensed_with_real(
            Route::ProposerApi,
            &[Route::Status, Route::RegisterValidators],
        );

        self.replace_condensed_with_real(
            Route::DataApi,
            &[Route::ProposerPayloadDelivered, Route::ValidatorRegistration],
        );
    }

    fn replace_condensed_with_real(&mut self, special_variant: Route, real_routes: &[Route]) {
        if self.enabled_routes.remove(&special_variant) {
            self.enabled_routes.extend(real_routes.iter().cloned());
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Route {
    All,
    BuilderApi,
    ProposerApi,
    DataApi,
    GetValidators,
    Status,
    RegisterValidators,
    ProposerPayloadDelivered,
    ValidatorRegistration,
}

impl Route {
    /// Full path of a real route, `None` for condensed variants.
    pub fn path(&self) -> Option<String> {
        let path = match self {
            Route::GetValidators => format!("{PATH_BUILDER_API}{PATH_GET_VALIDATORS}"),
            Route::Status => format!("{PATH_PROPOSER_API}{PATH_STATUS}"),
            Route::RegisterValidators => format!("{PATH_PROPOSER_API}{PATH_REGISTER_VALIDATORS}"),
            Route::ProposerPayloadDelivered => {
                format!("{PATH_DATA_API}{PATH_PROPOSER_PAYLOAD_DELIVERED}")
            }
            Route::ValidatorRegistration => format!("{PATH_DATA_API}{PATH_VALIDATOR_REGISTRATION}"),
            Route::All | Route::BuilderApi | Route::ProposerApi | Route::DataApi => return None,
        };
        Some(path)
    }
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 4040))
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_intake_workers() -> usize {
    4
}

fn default_intake_queue_capacity() -> usize {
    10_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let mut config = RelayConfig {
            listen_address: default_listen_address(),
            redis: Some(RedisConfig { url: "redis://localhost:6379".to_string() }),
            ..Default::default()
        };
        config.beacon_clients.push(BeaconClientConfig { url: "http://localhost:5052".to_string() });
        config.network_config = NetworkConfig::Holesky;
        config.logging =
            LoggingConfig::File { dir_path: "hello".to_string(), file_name: "test".to_string() };
        config.router_config = RouterConfig {
            enabled_routes: [Route::ProposerApi, Route::ProposerPayloadDelivered]
                .into_iter()
                .collect(),
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        println!("{yaml}");

        let decoded: RelayConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded.beacon_clients.len(), 1);
        assert_eq!(decoded.router_config, config.router_config);
        assert_eq!(decoded.registrations.workers, 4);
    }

    #[test]
    fn test_minimal_config_defaults() {
        let yaml = r#"
postgres:
  hostname: localhost
  db_name: helix
  user: postgres
  password: postgres
beacon_clients:
  - url: http://localhost:5052
"#;
        let config: RelayConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(config.redis.is_none());
        assert_eq!(config.postgres.port, 5432);
        assert_eq!(config.listen_address.port(), 4040);
        assert_eq!(config.registrations.queue_capacity, 10_000);
        assert!(config.router_config.enabled_routes.contains(&Route::All));
        assert!(matches!(config.network_config, NetworkConfig::Mainnet));
    }

    #[test]
    fn test_resolve_condensed_routes() {
        let mut router_config = RouterConfig::default();
        router_config.resolve_condensed_routes();

        let expected: HashSet<Route> = [
            Route::GetValidators,
            Route::Status,
            Route::RegisterValidators,
            Route::ProposerPayloadDelivered,
            Route::ValidatorRegistration,
        ]
        .into_iter()
        .collect();
        assert_eq!(router_config.enabled_routes, expected);
        assert!(router_config.enabled_routes.iter().all(|route| route.path().is_some()));
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Status.path().unwrap(), "/eth/v1/builder/status");
        assert_eq!(Route::RegisterValidators.path().unwrap(), "/eth/v1/builder/validators");
        assert_eq!(Route::GetValidators.path().unwrap(), "/relay/v1/builder/validators");
        assert_eq!(
            Route::ProposerPayloadDelivered.path().unwrap(),
            "/relay/v1/data/bidtraces/proposer_payload_delivered"
        );
        assert!(Route::All.path().is_none());
    }

    #[test]
    fn test_network_chain_info() {
        let chain_info = NetworkConfig::Sepolia.to_chain_info().unwrap();
        assert_eq!(chain_info.name, "sepolia");
        assert!(NetworkConfig::Custom {
            dir_path: "/does/not/exist".to_string(),
            genesis_validator_root: B256::ZERO,
            genesis_time: 0,
        }
        .to_chain_info()
        .is_err());
    }
}
