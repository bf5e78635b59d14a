pub mod error;
pub mod known_validators;
pub mod local;
pub mod redis;
pub mod traits;
mod types;

pub use known_validators::{KnownValidatorCache, KnownValidators};
pub use local::local_registrations::LocalRegistrationStore;
pub use redis::redis_registrations::RedisRegistrationStore;
pub use traits::RegistrationStore;
