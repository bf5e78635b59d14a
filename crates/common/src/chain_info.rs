use alloy_primitives::B256;
use helix_types::{Epoch, Slot};
use lh_types::{ChainSpec, EthSpec, MainnetEthSpec};

use crate::utils::utcnow_sec;

pub(crate) const MAINNET_GENESIS_VALIDATOR_ROOT: [u8; 32] = [
    75, 54, 61, 185, 78, 40, 97, 32, 215, 110, 185, 5, 52, 15, 221, 78, 84, 191, 233, 240, 107,
    243, 63, 246, 207, 90, 210, 127, 81, 27, 254, 149,
];
pub(crate) const MAINNET_GENESIS_TIME: u64 = 1606824023;

pub(crate) const SEPOLIA_GENESIS_VALIDATOR_ROOT: B256 =
    alloy_primitives::b256!("d8ea171f3c94aea21ebc42a1ed61052acf3f9209c00e4efbaaddac09ed9b8078");
pub(crate) const SEPOLIA_GENESIS_TIME: u64 = 1655733600;
const SEPOLIA_GENESIS_FORK_VERSION: [u8; 4] = [0x90, 0x00, 0x00, 0x69];

pub(crate) const HOLESKY_GENESIS_VALIDATOR_ROOT: B256 =
    alloy_primitives::b256!("9143aa7c615a7f7115e2b6aac319c03529df8242ae705fba9df39b79c59fa8b1");
pub(crate) const HOLESKY_GENESIS_TIME: u64 = 1695902400;
const HOLESKY_GENESIS_FORK_VERSION: [u8; 4] = [0x01, 0x01, 0x70, 0x00];

pub(crate) const HOODI_GENESIS_VALIDATOR_ROOT: B256 =
    alloy_primitives::b256!("212f13fc4df078b6cb7db228f1c8307566dcecf900867401a92023d7ba99cb5f");
pub(crate) const HOODI_GENESIS_TIME: u64 = 1742213400;
const HOODI_GENESIS_FORK_VERSION: [u8; 4] = [0x10, 0x00, 0x09, 0x10];

/// Runtime config with all chain specific information
#[derive(Debug, Clone)]
pub struct ChainInfo {
    pub name: String,
    pub genesis_validators_root: B256,
    pub spec: ChainSpec,
    pub genesis_time_in_secs: u64,
    pub builder_domain: B256,
}

impl ChainInfo {
    pub fn new(spec: ChainSpec, genesis_validators_root: B256, genesis_time_in_secs: u64) -> Self {
        let name = spec.config_name.clone().unwrap_or_else(|| "custom".to_string());
        let builder_domain = spec.get_builder_domain();
        Self { name, genesis_validators_root, spec, genesis_time_in_secs, builder_domain }
    }

    pub fn for_mainnet() -> Self {
        Self::new(ChainSpec::mainnet(), MAINNET_GENESIS_VALIDATOR_ROOT.into(), MAINNET_GENESIS_TIME)
    }

    pub fn for_sepolia() -> Self {
        Self::testnet(
            "sepolia",
            SEPOLIA_GENESIS_FORK_VERSION,
            SEPOLIA_GENESIS_VALIDATOR_ROOT,
            SEPOLIA_GENESIS_TIME,
        )
    }

    pub fn for_holesky() -> Self {
        Self::testnet(
            "holesky",
            HOLESKY_GENESIS_FORK_VERSION,
            HOLESKY_GENESIS_VALIDATOR_ROOT,
            HOLESKY_GENESIS_TIME,
        )
    }

    pub fn for_hoodi() -> Self {
        Self::testnet(
            "hoodi",
            HOODI_GENESIS_FORK_VERSION,
            HOODI_GENESIS_VALIDATOR_ROOT,
            HOODI_GENESIS_TIME,
        )
    }

    /// Public testnets share the mainnet preset; only the genesis fork version feeds the builder
    /// domain.
    fn testnet(
        name: &str,
        genesis_fork_version: [u8; 4],
        genesis_validators_root: B256,
        genesis_time_in_secs: u64,
    ) -> Self {
        let mut spec = ChainSpec::mainnet();
        spec.config_name = Some(name.to_string());
        spec.genesis_fork_version = genesis_fork_version;
        Self::new(spec, genesis_validators_root, genesis_time_in_secs)
    }

    pub fn seconds_per_slot(&self) -> u64 {
        self.spec.seconds_per_slot
    }

    pub fn slots_per_epoch(&self) -> u64 {
        MainnetEthSpec::slots_per_epoch()
    }

    pub fn epoch_at(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch()
    }

    /// Returns the position of the slot in the epoch, 0-31.
    pub fn slot_in_epoch(&self, slot: Slot) -> u64 {
        slot % self.slots_per_epoch()
    }

    /// Current slot based on wall clock time, 0 before genesis.
    pub fn current_slot(&self) -> Slot {
        utcnow_sec().saturating_sub(self.genesis_time_in_secs) / self.seconds_per_slot()
    }
}

impl Default for ChainInfo {
    fn default() -> Self {
        Self::for_mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAINNET_BUILDER_DOMAIN: [u8; 32] = [
        0, 0, 0, 1, 245, 165, 253, 66, 209, 106, 32, 48, 39, 152, 239, 110, 211, 9, 151, 155, 67,
        0, 61, 35, 32, 217, 240, 232, 234, 152, 49, 169,
    ];

    #[test]
    fn test_mainnet_builder_domain() {
        let chain_info = ChainInfo::for_mainnet();
        assert_eq!(chain_info.builder_domain, B256::from(MAINNET_BUILDER_DOMAIN));
        assert_eq!(chain_info.name, "mainnet");
    }

    #[test]
    fn test_testnet_domains_differ() {
        let mainnet = ChainInfo::for_mainnet().builder_domain;
        let sepolia = ChainInfo::for_sepolia().builder_domain;
        let holesky = ChainInfo::for_holesky().builder_domain;

        assert_ne!(mainnet, sepolia);
        assert_ne!(sepolia, holesky);
        // application domain type is shared across networks
        assert_eq!(sepolia[..4], mainnet[..4]);
    }

    #[test]
    fn test_slot_math() {
        let chain_info = ChainInfo::for_mainnet();
        assert_eq!(chain_info.epoch_at(64), 2);
        assert_eq!(chain_info.slot_in_epoch(68), 4);
        assert!(chain_info.current_slot() > 7_000_000);
    }
}
