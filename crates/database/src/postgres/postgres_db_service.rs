use std::ops::DerefMut;

use async_trait::async_trait;
use deadpool_postgres::{Config, ManagerConfig, Pool, RecyclingMethod};
use helix_common::{api::data_api::BidFilters, RelayConfig};
use tokio_postgres::{types::ToSql, NoTls};
use tracing::info;

use crate::{
    error::DatabaseError,
    postgres::{
        postgres_db_filters::{PgBidFilters, INSERT_DELIVERED_PAYLOAD},
        postgres_db_init::run_migrations_async,
        postgres_db_row_parsing::parse_rows,
        postgres_db_u256_parsing::PostgresNumeric,
    },
    DatabaseService, DeliveredPayloadDocument,
};

#[derive(Clone)]
pub struct PostgresDatabaseService {
    pool: Pool,
}

impl PostgresDatabaseService {
    pub fn new(cfg: &Config) -> Result<Self, DatabaseError> {
        let pool = cfg.create_pool(None, NoTls)?;
        Ok(PostgresDatabaseService { pool })
    }

    pub fn from_relay_config(relay_config: &RelayConfig) -> Result<Self, DatabaseError> {
        let mut cfg = Config::new();
        cfg.host = Some(relay_config.postgres.hostname.clone());
        cfg.port = Some(relay_config.postgres.port);
        cfg.dbname = Some(relay_config.postgres.db_name.clone());
        cfg.user = Some(relay_config.postgres.user.clone());
        cfg.password = Some(relay_config.postgres.password.clone());
        cfg.manager = Some(ManagerConfig { recycling_method: RecyclingMethod::Fast });
        Self::new(&cfg)
    }

    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let mut conn = self.pool.get().await?;
        let client = conn.deref_mut().deref_mut();
        let report = run_migrations_async(client).await?;
        info!(applied_migrations = report.applied_migrations().len(), "applied migrations");
        Ok(())
    }
}

#[async_trait]
impl DatabaseService for PostgresDatabaseService {
    async fn save_delivered_payload(
        &self,
        payload: &DeliveredPayloadDocument,
    ) -> Result<(), DatabaseError> {
        let client = self.pool.get().await?;
        client
            .execute(
                INSERT_DELIVERED_PAYLOAD,
                &[
                    &payload.block_hash.as_slice(),
                    &(payload.slot as i64),
                    &payload.parent_hash.as_slice(),
                    &payload.builder_pubkey.as_slice(),
                    &payload.proposer_pubkey.as_slice(),
                    &payload.proposer_fee_recipient.as_slice(),
                    &(payload.gas_limit as i64),
                    &(payload.gas_used as i64),
                    &PostgresNumeric::from(payload.value),
                    &(payload.block_number as i64),
                    &(payload.num_txs as i64),
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_delivered_payloads(
        &self,
        filters: &BidFilters,
    ) -> Result<Vec<DeliveredPayloadDocument>, DatabaseError> {
        let (query, params) = PgBidFilters::from(filters).delivered_payloads_query();
        let params_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| &**p as &(dyn ToSql + Sync)).collect();

        let client = self.pool.get().await?;
        let rows = client.query(query.as_str(), &params_refs[..]).await?;
        parse_rows(rows)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256, U256};
    use helix_types::BlsPublicKeyBytes;
    use serial_test::serial;

    use super::*;

    fn test_service() -> PostgresDatabaseService {
        let mut cfg = Config::new();
        cfg.host = Some("localhost".to_string());
        cfg.port = Some(5432);
        cfg.dbname = Some("helix".to_string());
        cfg.user = Some("postgres".to_string());
        cfg.password = Some("password".to_string());
        cfg.manager = Some(ManagerConfig { recycling_method: RecyclingMethod::Fast });
        PostgresDatabaseService::new(&cfg).unwrap()
    }

    fn payload(slot: u64) -> DeliveredPayloadDocument {
        DeliveredPayloadDocument {
            slot,
            parent_hash: B256::repeat_byte(9),
            block_hash: B256::with_last_byte(slot as u8),
            builder_pubkey: BlsPublicKeyBytes::repeat_byte(1),
            proposer_pubkey: BlsPublicKeyBytes::repeat_byte(2),
            proposer_fee_recipient: Address::repeat_byte(3),
            gas_limit: 30_000_000,
            gas_used: 12_000_000,
            value: U256::from(10).pow(U256::from(18)) + U256::from(slot),
            block_number: 20_000_000 + slot,
            num_txs: 150,
        }
    }

    #[tokio::test]
    #[serial]
    #[ignore = "requires postgres"]
    async fn test_save_and_get_delivered_payloads() {
        let db = test_service();
        db.run_migrations().await.unwrap();

        for slot in 1..=3 {
            db.save_delivered_payload(&payload(slot)).await.unwrap();
        }

        let filters =
            BidFilters { block_hash: Some(B256::with_last_byte(2)), ..Default::default() };
        let found = db.get_delivered_payloads(&filters).await.unwrap();
        assert_eq!(found, vec![payload(2)]);

        let filters = BidFilters { cursor: Some(2), limit: Some(1), ..Default::default() };
        let found = db.get_delivered_payloads(&filters).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slot, 2);
    }
}
