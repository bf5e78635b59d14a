use helix_common::api::data_api::BidFilters;
use tokio_postgres::types::ToSql;

const DELIVERED_PAYLOAD_COLUMNS: &str = "slot_number, parent_hash, block_hash, builder_pubkey, \
     proposer_pubkey, proposer_fee_recipient, gas_limit, gas_used, value, block_number, num_txs";

pub type SqlParams = Vec<Box<dyn ToSql + Sync + Send>>;

/// Postgres view of `BidFilters`: integer columns are BIGINT, keys and hashes BYTEA.
#[derive(Clone, Debug)]
pub struct PgBidFilters(BidFilters);

impl From<&BidFilters> for PgBidFilters {
    fn from(value: &BidFilters) -> Self {
        PgBidFilters(value.clone())
    }
}

impl From<BidFilters> for PgBidFilters {
    fn from(value: BidFilters) -> Self {
        PgBidFilters(value)
    }
}

impl PgBidFilters {
    pub fn slot(&self) -> Option<i64> {
        self.0.slot.map(saturating_i64)
    }

    pub fn cursor(&self) -> Option<i64> {
        self.0.cursor.map(saturating_i64)
    }

    pub fn block_number(&self) -> Option<i64> {
        self.0.block_number.map(saturating_i64)
    }

    pub fn proposer_pubkey(&self) -> Option<Vec<u8>> {
        self.0.proposer_pubkey.as_ref().map(|pubkey| pubkey.to_vec())
    }

    pub fn builder_pubkey(&self) -> Option<Vec<u8>> {
        self.0.builder_pubkey.as_ref().map(|pubkey| pubkey.to_vec())
    }

    pub fn block_hash(&self) -> Option<Vec<u8>> {
        self.0.block_hash.as_ref().map(|block_hash| block_hash.to_vec())
    }

    pub fn order(&self) -> Option<i8> {
        self.0.order_by
    }

    pub fn limit(&self) -> Option<i64> {
        self.0.limit.map(saturating_i64)
    }

    /// Builds the select for `delivered_payload` with one positional parameter per set filter.
    pub fn delivered_payloads_query(&self) -> (String, SqlParams) {
        let mut query =
            format!("SELECT {DELIVERED_PAYLOAD_COLUMNS} FROM delivered_payload WHERE 1 = 1");
        let mut params: SqlParams = Vec::new();

        let mut push = |clause: &str, param: Box<dyn ToSql + Sync + Send>| {
            params.push(param);
            query.push_str(&format!(" AND {clause} ${}", params.len()));
        };

        if let Some(slot) = self.slot() {
            push("slot_number =", Box::new(slot));
        }
        if let Some(cursor) = self.cursor() {
            push("slot_number <=", Box::new(cursor));
        }
        if let Some(block_number) = self.block_number() {
            push("block_number =", Box::new(block_number));
        }
        if let Some(proposer_pubkey) = self.proposer_pubkey() {
            push("proposer_pubkey =", Box::new(proposer_pubkey));
        }
        if let Some(builder_pubkey) = self.builder_pubkey() {
            push("builder_pubkey =", Box::new(builder_pubkey));
        }
        if let Some(block_hash) = self.block_hash() {
            push("block_hash =", Box::new(block_hash));
        }

        match self.order() {
            Some(order) => {
                query.push_str(" ORDER BY value ");
                query.push_str(if order >= 0 { "ASC" } else { "DESC" });
            }
            None => query.push_str(" ORDER BY slot_number DESC"),
        }

        if let Some(limit) = self.limit() {
            params.push(Box::new(limit));
            query.push_str(&format!(" LIMIT ${}", params.len()));
        }

        (query, params)
    }
}

/// Postgres has no unsigned bigint. Values past `i64::MAX` clamp so range filters stay open-ended.
fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Insert for a delivered payload. A repeated block hash is ignored.
pub const INSERT_DELIVERED_PAYLOAD: &str = "
    INSERT INTO delivered_payload (
        block_hash, slot_number, parent_hash, builder_pubkey, proposer_pubkey,
        proposer_fee_recipient, gas_limit, gas_used, value, block_number, num_txs
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    ON CONFLICT (block_hash) DO NOTHING
";
