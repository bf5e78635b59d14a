use redis::RedisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RedisCacheError {
    #[error("redis error: {0}")]
    RedisError(#[from] RedisError),

    #[error("redis pool error: {0}")]
    RedisPoolError(#[from] deadpool_redis::PoolError),

    #[error("redis create pool error: {0}")]
    CreatePoolError(#[from] deadpool_redis::CreatePoolError),

    #[error("serde_json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}
