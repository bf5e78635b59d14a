use async_trait::async_trait;
use auto_impl::auto_impl;
use helix_common::api::data_api::BidFilters;

use crate::{error::DatabaseError, types::DeliveredPayloadDocument};

#[async_trait]
#[auto_impl(Arc)]
pub trait DatabaseService: Send + Sync + 'static {
    async fn save_delivered_payload(
        &self,
        payload: &DeliveredPayloadDocument,
    ) -> Result<(), DatabaseError>;

    /// Delivered payloads matching `filters`, newest slot first unless an order is given.
    async fn get_delivered_payloads(
        &self,
        filters: &BidFilters,
    ) -> Result<Vec<DeliveredPayloadDocument>, DatabaseError>;
}
