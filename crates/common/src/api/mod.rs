pub mod builder_api;
pub mod data_api;

pub const PATH_BUILDER_API: &str = "/relay/v1/builder";
pub const PATH_GET_VALIDATORS: &str = "/validators";

pub const PATH_PROPOSER_API: &str = "/eth/v1/builder";

pub const PATH_STATUS: &str = "/status";
pub const PATH_REGISTER_VALIDATORS: &str = "/validators";

pub const PATH_DATA_API: &str = "/relay/v1/data";

pub const PATH_PROPOSER_PAYLOAD_DELIVERED: &str = "/bidtraces/proposer_payload_delivered";
pub const PATH_VALIDATOR_REGISTRATION: &str = "/validator_registration";
