use helix_types::BlsPublicKeyBytes;

pub(crate) const VALIDATOR_REGISTRATION_KEY: &str = "validator-registration";

pub(crate) const REGISTRATION_TIMESTAMP_FIELD: &str = "timestamp";
pub(crate) const REGISTRATION_ENTRY_FIELD: &str = "entry";

pub(crate) fn validator_registration_key(pubkey: &BlsPublicKeyBytes) -> String {
    format!("{VALIDATOR_REGISTRATION_KEY}:{pubkey}")
}
