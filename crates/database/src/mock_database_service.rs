use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use helix_common::api::data_api::BidFilters;

use crate::{error::DatabaseError, DatabaseService, DeliveredPayloadDocument};

/// In-memory delivered payload archive applying the same filters as the postgres queries.
#[derive(Default, Clone)]
pub struct MockDatabaseService {
    delivered_payloads: Arc<Mutex<Vec<DeliveredPayloadDocument>>>,
}

impl MockDatabaseService {
    pub fn new(delivered_payloads: Vec<DeliveredPayloadDocument>) -> Self {
        Self { delivered_payloads: Arc::new(Mutex::new(delivered_payloads)) }
    }

    fn matches(filters: &BidFilters, payload: &DeliveredPayloadDocument) -> bool {
        filters.slot.map_or(true, |slot| payload.slot == slot) &&
            filters.cursor.map_or(true, |cursor| payload.slot <= cursor) &&
            filters.block_number.map_or(true, |n| payload.block_number == n) &&
            filters.block_hash.map_or(true, |hash| payload.block_hash == hash) &&
            filters.proposer_pubkey.map_or(true, |pk| payload.proposer_pubkey == pk) &&
            filters.builder_pubkey.map_or(true, |pk| payload.builder_pubkey == pk)
    }
}

#[async_trait]
impl DatabaseService for MockDatabaseService {
    async fn save_delivered_payload(
        &self,
        payload: &DeliveredPayloadDocument,
    ) -> Result<(), DatabaseError> {
        let mut delivered = self.delivered_payloads.lock().unwrap_or_else(|e| e.into_inner());
        delivered.retain(|p| p.block_hash != payload.block_hash);
        delivered.push(payload.clone());
        Ok(())
    }

    async fn get_delivered_payloads(
        &self,
        filters: &BidFilters,
    ) -> Result<Vec<DeliveredPayloadDocument>, DatabaseError> {
        let delivered = self.delivered_payloads.lock().unwrap_or_else(|e| e.into_inner());
        let mut payloads: Vec<_> =
            delivered.iter().filter(|p| Self::matches(filters, p)).cloned().collect();

        match filters.order_by {
            Some(order) if order >= 0 => payloads.sort_by(|a, b| a.value.cmp(&b.value)),
            Some(_) => payloads.sort_by(|a, b| b.value.cmp(&a.value)),
            None => payloads.sort_by(|a, b| b.slot.cmp(&a.slot)),
        }

        if let Some(limit) = filters.limit {
            payloads.truncate(limit as usize);
        }

        Ok(payloads)
    }
}
