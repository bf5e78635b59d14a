mod error;
pub mod test_utils;
mod validator;

pub use error::*;
pub use validator::*;

pub type Slot = u64;
pub type Epoch = u64;

pub type BlsPublicKey = lh_bls::PublicKey;
/// Compressed public key, used as map key wherever the point itself is not needed.
pub type BlsPublicKeyBytes = alloy_primitives::FixedBytes<48>;
pub type BlsSignature = lh_bls::Signature;
pub type BlsSecretKey = lh_bls::SecretKey;

pub fn pubkey_bytes(pubkey: &BlsPublicKey) -> BlsPublicKeyBytes {
    BlsPublicKeyBytes::from(pubkey.serialize())
}
