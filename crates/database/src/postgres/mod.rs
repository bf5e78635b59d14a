pub mod postgres_db_filters;
pub mod postgres_db_init;
pub mod postgres_db_row_parsing;
pub mod postgres_db_service;
pub mod postgres_db_u256_parsing;
