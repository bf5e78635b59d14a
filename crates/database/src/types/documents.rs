use alloy_primitives::{Address, B256, U256};
use helix_common::api::data_api::DeliveredPayloadsResponse;
use helix_types::BlsPublicKeyBytes;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredPayloadDocument {
    pub slot: u64,
    pub parent_hash: B256,
    pub block_hash: B256,
    pub builder_pubkey: BlsPublicKeyBytes,
    pub proposer_pubkey: BlsPublicKeyBytes,
    pub proposer_fee_recipient: Address,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub value: U256,
    pub block_number: u64,
    pub num_txs: u64,
}

impl From<DeliveredPayloadDocument> for DeliveredPayloadsResponse {
    fn from(doc: DeliveredPayloadDocument) -> Self {
        Self {
            slot: doc.slot,
            parent_hash: doc.parent_hash,
            block_hash: doc.block_hash,
            builder_pubkey: doc.builder_pubkey,
            proposer_pubkey: doc.proposer_pubkey,
            proposer_fee_recipient: doc.proposer_fee_recipient,
            gas_limit: doc.gas_limit,
            gas_used: doc.gas_used,
            value: doc.value,
            block_number: doc.block_number,
            num_tx: doc.num_txs,
        }
    }
}
