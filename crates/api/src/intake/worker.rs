use std::sync::Arc;

use alloy_primitives::B256;
use helix_common::SignedValidatorRegistrationEntry;
use helix_datastore::RegistrationStore;
use helix_types::SignedValidatorRegistration;
use tokio::runtime;
use tracing::{debug, error, trace, warn};

use crate::proposer::ProposerApiError;

pub(super) struct Worker<S: RegistrationStore> {
    pub(super) rx: crossbeam_channel::Receiver<SignedValidatorRegistration>,
    pub(super) store: Arc<S>,
    pub(super) builder_domain: B256,
    pub(super) runtime: runtime::Handle,
}

impl<S: RegistrationStore> Worker<S> {
    pub(super) fn run(self) {
        while let Ok(registration) = self.rx.recv() {
            self.handle_registration(registration);
        }
        debug!("registration queue closed, worker exiting");
    }

    fn handle_registration(&self, registration: SignedValidatorRegistration) {
        let pubkey = registration.pubkey();

        if let Err(err) = registration.verify_signature(self.builder_domain) {
            let err = ProposerApiError::from(err);
            warn!(%pubkey, %err, "dropping registration");
            return;
        }

        let entry = SignedValidatorRegistrationEntry::new(registration);
        match self.runtime.block_on(self.store.save_if_newer(entry)) {
            Ok(true) => trace!(%pubkey, "stored registration"),
            Ok(false) => trace!(%pubkey, "registration not newer than stored one"),
            Err(err) => error!(%pubkey, %err, "failed to store registration"),
        }
    }
}
