mod api;
mod error;
mod register;

pub use api::ProposerApi;
pub use error::ProposerApiError;
pub use register::MAX_TIMESTAMP_DRIFT_SECS;
