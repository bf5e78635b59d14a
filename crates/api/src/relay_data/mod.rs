pub(crate) mod api;
mod error;

pub use api::{DataApi, DeliveredPayloadsCache};
pub use error::DataApiError;
