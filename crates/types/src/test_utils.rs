use alloy_primitives::{Address, B256};
use lh_types::SignedRoot;

use crate::{BlsSecretKey, SignedValidatorRegistration, ValidatorRegistration};

pub fn random_secret_key() -> BlsSecretKey {
    BlsSecretKey::random()
}

/// Registration for `sk` signed over `builder_domain`.
pub fn signed_registration(
    sk: &BlsSecretKey,
    timestamp: u64,
    builder_domain: B256,
) -> SignedValidatorRegistration {
    let message = ValidatorRegistration {
        fee_recipient: Address::repeat_byte(0x42),
        gas_limit: 30_000_000,
        timestamp,
        pubkey: sk.public_key(),
    };
    let signature = sk.sign(message.signing_root(builder_domain));

    SignedValidatorRegistration { message, signature }
}
