use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use helix_types::BlsPublicKeyBytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct BidFilters {
    pub slot: Option<u64>,
    pub cursor: Option<u64>,
    pub limit: Option<u64>,
    pub block_hash: Option<B256>,
    pub block_number: Option<u64>,
    pub proposer_pubkey: Option<BlsPublicKeyBytes>,
    pub builder_pubkey: Option<BlsPublicKeyBytes>,
    pub order_by: Option<i8>,
}

/// Query string of `proposer_payload_delivered`. `block_hash` is kept raw so its shape can be
/// checked before it reaches storage.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProposerPayloadDeliveredParams {
    pub slot: Option<u64>,
    pub cursor: Option<u64>,
    pub limit: Option<u64>,
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub proposer_pubkey: Option<BlsPublicKeyBytes>,
    pub builder_pubkey: Option<BlsPublicKeyBytes>,
    pub order_by: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid block_hash argument")]
pub struct InvalidBlockHash;

/// Parses a `0x`-prefixed, 64 hex character block hash. Anything else is rejected.
pub fn parse_block_hash(raw: &str) -> Result<B256, InvalidBlockHash> {
    let Some(hex) = raw.strip_prefix("0x") else {
        return Err(InvalidBlockHash);
    };
    if hex.len() != 64 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(InvalidBlockHash);
    }
    B256::from_str(raw).map_err(|_| InvalidBlockHash)
}

impl TryFrom<ProposerPayloadDeliveredParams> for BidFilters {
    type Error = InvalidBlockHash;

    fn try_from(value: ProposerPayloadDeliveredParams) -> Result<Self, Self::Error> {
        let block_hash = value.block_hash.as_deref().map(parse_block_hash).transpose()?;

        Ok(BidFilters {
            slot: value.slot,
            cursor: value.cursor,
            limit: value.limit,
            block_hash,
            block_number: value.block_number,
            proposer_pubkey: value.proposer_pubkey,
            builder_pubkey: value.builder_pubkey,
            order_by: match value.order_by.as_deref() {
                Some("value") => Some(1),
                Some("-value") => Some(-1),
                _ => None,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredPayloadsResponse {
    #[serde(with = "serde_utils::quoted_u64")]
    pub slot: u64,
    pub parent_hash: B256,
    pub block_hash: B256,
    pub builder_pubkey: BlsPublicKeyBytes,
    pub proposer_pubkey: BlsPublicKeyBytes,
    pub proposer_fee_recipient: Address,
    #[serde(with = "serde_utils::quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub gas_used: u64,
    #[serde(with = "serde_utils::quoted_u256")]
    pub value: U256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub block_number: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub num_tx: u64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValidatorRegistrationParams {
    pub pubkey: BlsPublicKeyBytes,
}
