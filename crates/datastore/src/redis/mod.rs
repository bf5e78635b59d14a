pub mod error;
pub mod redis_registrations;
