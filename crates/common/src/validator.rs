use alloy_primitives::B256;
use helix_types::{BlsPublicKeyBytes, SignedValidatorRegistration};
use serde::{Deserialize, Serialize};

use crate::utils::utcnow_ms;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSummary {
    #[serde(with = "serde_utils::quoted_u64")]
    pub index: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub balance: u64,
    pub status: ValidatorStatus,
    pub validator: Validator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    pub pubkey: BlsPublicKeyBytes,
    pub withdrawal_credentials: B256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub effective_balance: u64,
    pub slashed: bool,
    #[serde(with = "serde_utils::quoted_u64")]
    pub activation_eligibility_epoch: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub activation_epoch: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub exit_epoch: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub withdrawable_epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorStatus {
    PendingInitialized,
    PendingQueued,
    ActiveOngoing,
    ActiveExiting,
    ActiveSlashed,
    ExitedUnslashed,
    ExitedSlashed,
    WithdrawalPossible,
    WithdrawalDone,
    Active,
    Pending,
    Exited,
    Withdrawal,
}

/// A registration as held by the registration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedValidatorRegistrationEntry {
    pub registration: SignedValidatorRegistration,
    /// Unix millis at which the relay stored the registration.
    pub inserted_at: u64,
}

impl SignedValidatorRegistrationEntry {
    pub fn new(registration: SignedValidatorRegistration) -> Self {
        Self { registration, inserted_at: utcnow_ms() }
    }

    pub fn pubkey(&self) -> BlsPublicKeyBytes {
        self.registration.pubkey()
    }

    pub fn timestamp(&self) -> u64 {
        self.registration.timestamp()
    }
}
