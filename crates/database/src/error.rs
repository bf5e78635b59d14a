use deadpool_postgres::{CreatePoolError, PoolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Postgres Pool error: {0}")]
    PostgresPool(#[from] PoolError),

    #[error("Postgres Pool creation error: {0}")]
    CreatePool(#[from] CreatePoolError),

    #[error("PostgresDB error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),

    #[error("row parsing error: {0}")]
    RowParsingError(String),
}
