use helix_types::{SignedValidatorRegistration, Slot};
use serde::{Deserialize, Serialize};

/// One row of the `GET /relay/v1/builder/validators` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderGetValidatorsResponseEntry {
    #[serde(with = "serde_utils::quoted_u64")]
    pub slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub validator_index: u64,
    pub entry: SignedValidatorRegistration,
}
