use alloy_primitives::{Address, B256};
use lh_types::SignedRoot;
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

use crate::{pubkey_bytes, BlsPublicKey, BlsPublicKeyBytes, BlsSignature, SigError};

/// Validator registration as submitted to `POST /eth/v1/builder/validators`.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct SignedValidatorRegistration {
    pub message: ValidatorRegistration,
    pub signature: BlsSignature,
}

#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, TreeHash)]
pub struct ValidatorRegistration {
    pub fee_recipient: Address,
    #[serde(with = "serde_utils::quoted_u64")]
    pub gas_limit: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub timestamp: u64,
    pub pubkey: BlsPublicKey,
}

impl SignedRoot for ValidatorRegistration {}

impl SignedValidatorRegistration {
    pub fn pubkey(&self) -> BlsPublicKeyBytes {
        pubkey_bytes(&self.message.pubkey)
    }

    pub fn timestamp(&self) -> u64 {
        self.message.timestamp
    }

    /// Verifies the signature over the registration message, mixed with `builder_domain`.
    pub fn verify_signature(&self, builder_domain: B256) -> Result<(), SigError> {
        let signing_root = self.message.signing_root(builder_domain);
        if self.signature.verify(&self.message.pubkey, signing_root) {
            Ok(())
        } else {
            Err(SigError::InvalidBlsSignature)
        }
    }
}

#[cfg(test)]
mod tests {
    use lh_types::ChainSpec;

    use super::*;
    use crate::test_utils::{random_secret_key, signed_registration};

    #[test]
    fn test_verify_registration_signature() {
        let domain = ChainSpec::mainnet().get_builder_domain();
        let sk = random_secret_key();
        let registration = signed_registration(&sk, 1_700_000_000, domain);

        assert!(registration.verify_signature(domain).is_ok());
        assert_eq!(registration.pubkey(), pubkey_bytes(&sk.public_key()));
    }

    #[test]
    fn test_tampered_registration_fails() {
        let domain = ChainSpec::mainnet().get_builder_domain();
        let sk = random_secret_key();
        let mut registration = signed_registration(&sk, 1_700_000_000, domain);
        registration.message.gas_limit += 1;

        assert!(matches!(
            registration.verify_signature(domain),
            Err(SigError::InvalidBlsSignature)
        ));
    }

    #[test]
    fn test_wrong_domain_fails() {
        let domain = ChainSpec::mainnet().get_builder_domain();
        let sk = random_secret_key();
        let registration = signed_registration(&sk, 1_700_000_000, domain);

        assert!(registration.verify_signature(B256::ZERO).is_err());
    }

    #[test]
    fn test_registration_json() {
        let domain = ChainSpec::mainnet().get_builder_domain();
        let registration = signed_registration(&random_secret_key(), 1_700_000_000, domain);

        let json = serde_json::to_value(&registration).unwrap();
        assert_eq!(json["message"]["timestamp"], "1700000000");
        assert_eq!(json["message"]["gas_limit"], "30000000");

        let decoded: SignedValidatorRegistration = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, registration);
    }
}
