use crossbeam_channel::TrySendError;
use helix_types::SignedValidatorRegistration;

use crate::proposer::ProposerApiError;

/// Producer side of the registration queue.
#[derive(Clone)]
pub struct RegistrationHandle {
    tx: crossbeam_channel::Sender<SignedValidatorRegistration>,
}

impl RegistrationHandle {
    pub(super) fn new(tx: crossbeam_channel::Sender<SignedValidatorRegistration>) -> Self {
        Self { tx }
    }

    /// Queues a registration for signature verification and storage. Never blocks.
    pub fn submit(
        &self,
        registration: SignedValidatorRegistration,
    ) -> Result<(), ProposerApiError> {
        self.tx.try_send(registration).map_err(|err| match err {
            TrySendError::Full(_) => ProposerApiError::RegistrationQueueFull,
            TrySendError::Disconnected(_) => ProposerApiError::RegistrationIntakeClosed,
        })
    }

    /// Registrations waiting for a worker.
    pub fn queued(&self) -> usize {
        self.tx.len()
    }
}
