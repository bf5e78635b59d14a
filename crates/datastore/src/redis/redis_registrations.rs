use std::collections::HashMap;

use async_trait::async_trait;
use deadpool_redis::{Config, CreatePoolError, Pool, Runtime};
use helix_common::SignedValidatorRegistrationEntry;
use helix_types::BlsPublicKeyBytes;
use redis::{AsyncCommands, Script};
use tracing::warn;

use crate::{
    error::RegistrationStoreError,
    redis::error::RedisCacheError,
    traits::RegistrationStore,
    types::keys::{
        validator_registration_key, REGISTRATION_ENTRY_FIELD, REGISTRATION_TIMESTAMP_FIELD,
    },
};

/// Writes the entry only if the stored timestamp is strictly older. Returns 1 when written.
const SAVE_IF_NEWER_SCRIPT: &str = r#"
local current = redis.call('HGET', KEYS[1], ARGV[1])
if current and tonumber(current) >= tonumber(ARGV[2]) then
    return 0
end
redis.call('HSET', KEYS[1], ARGV[1], ARGV[2], ARGV[3], ARGV[4])
return 1
"#;

/// Registration store shared between relay instances.
#[derive(Clone)]
pub struct RedisRegistrationStore {
    pool: Pool,
    save_if_newer_script: Script,
}

impl RedisRegistrationStore {
    pub fn new(conn_str: &str) -> Result<Self, CreatePoolError> {
        let cfg = Config::from_url(conn_str);
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool, save_if_newer_script: Script::new(SAVE_IF_NEWER_SCRIPT) })
    }

    async fn save(
        &self,
        entry: &SignedValidatorRegistrationEntry,
    ) -> Result<bool, RedisCacheError> {
        let mut conn = self.pool.get().await?;
        let key = validator_registration_key(&entry.pubkey());
        let str_val = serde_json::to_string(entry)?;

        let written: i64 = self
            .save_if_newer_script
            .key(key)
            .arg(REGISTRATION_TIMESTAMP_FIELD)
            .arg(entry.timestamp())
            .arg(REGISTRATION_ENTRY_FIELD)
            .arg(str_val)
            .invoke_async(&mut conn)
            .await?;

        Ok(written == 1)
    }

    async fn get(
        &self,
        pubkey: &BlsPublicKeyBytes,
    ) -> Result<Option<SignedValidatorRegistrationEntry>, RedisCacheError> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> =
            conn.hget(validator_registration_key(pubkey), REGISTRATION_ENTRY_FIELD).await?;

        match value {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    async fn get_many(
        &self,
        pubkeys: &[BlsPublicKeyBytes],
    ) -> Result<HashMap<BlsPublicKeyBytes, SignedValidatorRegistrationEntry>, RedisCacheError> {
        if pubkeys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut conn = self.pool.get().await?;
        let mut pipeline = redis::pipe();
        for pubkey in pubkeys {
            pipeline.hget(validator_registration_key(pubkey), REGISTRATION_ENTRY_FIELD);
        }
        let values: Vec<Option<String>> = pipeline.query_async(&mut conn).await?;

        let mut registrations = HashMap::with_capacity(values.len());
        for (pubkey, value) in pubkeys.iter().zip(values) {
            let Some(value) = value else { continue };
            match serde_json::from_str(&value) {
                Ok(entry) => {
                    registrations.insert(*pubkey, entry);
                }
                Err(err) => warn!(%err, %pubkey, "skipping undecodable registration"),
            }
        }

        Ok(registrations)
    }
}

#[async_trait]
impl RegistrationStore for RedisRegistrationStore {
    async fn save_if_newer(
        &self,
        entry: SignedValidatorRegistrationEntry,
    ) -> Result<bool, RegistrationStoreError> {
        Ok(self.save(&entry).await?)
    }

    async fn get_registration(
        &self,
        pubkey: &BlsPublicKeyBytes,
    ) -> Result<Option<SignedValidatorRegistrationEntry>, RegistrationStoreError> {
        Ok(self.get(pubkey).await?)
    }

    async fn get_registrations(
        &self,
        pubkeys: &[BlsPublicKeyBytes],
    ) -> Result<
        HashMap<BlsPublicKeyBytes, SignedValidatorRegistrationEntry>,
        RegistrationStoreError,
    > {
        Ok(self.get_many(pubkeys).await?)
    }
}
