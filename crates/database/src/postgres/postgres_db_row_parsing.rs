use alloy_primitives::{Address, FixedBytes, B256};
use helix_types::BlsPublicKeyBytes;
use tokio_postgres::Row;

use crate::{
    error::DatabaseError, postgres::postgres_db_u256_parsing::PostgresNumeric,
    DeliveredPayloadDocument,
};

pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, DatabaseError>
    where
        Self: Sized;
}

impl FromRow for DeliveredPayloadDocument {
    fn from_row(row: &Row) -> Result<Self, DatabaseError> {
        Ok(DeliveredPayloadDocument {
            slot: parse_i64_to_u64(row.try_get("slot_number")?)?,
            parent_hash: parse_bytes_to_hash(row.try_get("parent_hash")?)?,
            block_hash: parse_bytes_to_hash(row.try_get("block_hash")?)?,
            builder_pubkey: parse_bytes_to_pubkey(row.try_get("builder_pubkey")?)?,
            proposer_pubkey: parse_bytes_to_pubkey(row.try_get("proposer_pubkey")?)?,
            proposer_fee_recipient: parse_bytes_to_address(row.try_get("proposer_fee_recipient")?)?,
            gas_limit: parse_i64_to_u64(row.try_get("gas_limit")?)?,
            gas_used: parse_i64_to_u64(row.try_get("gas_used")?)?,
            value: row.try_get::<_, PostgresNumeric>("value")?.into(),
            block_number: parse_i64_to_u64(row.try_get("block_number")?)?,
            num_txs: parse_i64_to_u64(row.try_get("num_txs")?)?,
        })
    }
}

pub fn parse_rows<T: FromRow>(rows: Vec<Row>) -> Result<Vec<T>, DatabaseError> {
    rows.iter().map(T::from_row).collect()
}

pub fn parse_i64_to_u64(value: i64) -> Result<u64, DatabaseError> {
    u64::try_from(value)
        .map_err(|_| DatabaseError::RowParsingError(format!("negative integer column: {value}")))
}

pub fn parse_bytes_to_fixed<const N: usize>(bytes: &[u8]) -> Result<FixedBytes<N>, DatabaseError> {
    FixedBytes::<N>::try_from(bytes).map_err(|_| {
        DatabaseError::RowParsingError(format!("expected {N} bytes, got {}", bytes.len()))
    })
}

pub fn parse_bytes_to_hash(bytes: &[u8]) -> Result<B256, DatabaseError> {
    parse_bytes_to_fixed::<32>(bytes)
}

pub fn parse_bytes_to_pubkey(bytes: &[u8]) -> Result<BlsPublicKeyBytes, DatabaseError> {
    parse_bytes_to_fixed::<48>(bytes)
}

pub fn parse_bytes_to_address(bytes: &[u8]) -> Result<Address, DatabaseError> {
    parse_bytes_to_fixed::<20>(bytes).map(Address::from)
}
