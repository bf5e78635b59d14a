mod handle;
mod worker;

use std::sync::Arc;

use alloy_primitives::B256;
pub use handle::RegistrationHandle;
use helix_datastore::RegistrationStore;
use helix_types::SignedValidatorRegistration;
use tokio::runtime;
use tracing::info;
use worker::Worker;

/// Creates the bounded registration queue. Nothing drains it until workers are spawned on the
/// returned receiver.
pub fn registration_queue(
    capacity: usize,
) -> (RegistrationHandle, crossbeam_channel::Receiver<SignedValidatorRegistration>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity);
    (RegistrationHandle::new(tx), rx)
}

/// Spawns `num_workers` threads verifying signatures and storing registrations from `rx`.
/// Workers exit once every handle is dropped and the queue is drained.
pub fn spawn_registration_workers<S: RegistrationStore>(
    rx: crossbeam_channel::Receiver<SignedValidatorRegistration>,
    num_workers: usize,
    store: Arc<S>,
    builder_domain: B256,
    runtime: runtime::Handle,
) -> std::io::Result<Vec<std::thread::JoinHandle<()>>> {
    (0..num_workers.max(1))
        .map(|id| {
            let worker = Worker {
                rx: rx.clone(),
                store: store.clone(),
                builder_domain,
                runtime: runtime.clone(),
            };
            std::thread::Builder::new().name(format!("registration-{id}")).spawn(move || {
                info!(id, "starting registration worker");
                worker.run()
            })
        })
        .collect()
}

/// Registration intake with its queue and worker pool started together.
pub fn start_registration_intake<S: RegistrationStore>(
    capacity: usize,
    num_workers: usize,
    store: Arc<S>,
    builder_domain: B256,
    runtime: runtime::Handle,
) -> std::io::Result<RegistrationHandle> {
    let (handle, rx) = registration_queue(capacity);
    spawn_registration_workers(rx, num_workers, store, builder_domain, runtime)?;
    Ok(handle)
}
