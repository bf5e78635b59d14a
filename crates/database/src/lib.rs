pub mod error;
pub mod mock_database_service;
pub mod postgres;
pub mod traits;
pub mod types;

use std::sync::Arc;

use helix_common::RelayConfig;
use postgres::postgres_db_service::PostgresDatabaseService;
pub use traits::*;
pub use types::*;

use crate::error::DatabaseError;

pub async fn start_db_service(
    config: &RelayConfig,
) -> Result<Arc<PostgresDatabaseService>, DatabaseError> {
    let postgres_db = PostgresDatabaseService::from_relay_config(config)?;
    postgres_db.run_migrations().await?;

    Ok(Arc::new(postgres_db))
}
