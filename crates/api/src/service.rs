use std::{
    net::SocketAddr,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use axum::Router;
use helix_common::spawn_tracked;
use tokio::{runtime::TryCurrentError, task::JoinHandle};
use tracing::{error, info};

pub(crate) const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ApiServiceError {
    #[error("api service already started")]
    AlreadyStarted,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no tokio runtime: {0}")]
    NoRuntime(#[from] TryCurrentError),
}

/// HTTP server for the relay routes. Can be started once.
pub struct ApiService {
    listen_address: SocketAddr,
    router: Router,
    started: AtomicBool,
}

impl ApiService {
    pub fn new(listen_address: SocketAddr, router: Router) -> Self {
        Self { listen_address, router, started: AtomicBool::new(false) }
    }

    /// Binds the listener and serves in a background task. A second call fails with
    /// `AlreadyStarted` and leaves the running server alone.
    pub fn start(&self) -> Result<JoinHandle<Result<(), ApiServiceError>>, ApiServiceError> {
        tokio::runtime::Handle::try_current()?;

        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ApiServiceError::AlreadyStarted);
        }

        let listen_address = self.listen_address;
        let router = self.router.clone();

        Ok(spawn_tracked!(async move {
            let listener = tokio::net::TcpListener::bind(listen_address).await.inspect_err(
                |err| error!(%listen_address, %err, "failed to bind api listener"),
            )?;
            info!(local_addr = ?listener.local_addr().ok(), "api service listening");

            match axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
                .await
            {
                Ok(_) => info!("Server exited successfully"),
                Err(e) => error!("Server exited with error: {e}"),
            }

            Ok::<_, ApiServiceError>(())
        }))
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_double_start_is_rejected() {
        let service = ApiService::new(SocketAddr::from(([127, 0, 0, 1], 0)), Router::new());

        let handle = service.start().unwrap();
        assert!(service.is_started());
        assert!(matches!(service.start(), Err(ApiServiceError::AlreadyStarted)));

        assert!(!handle.is_finished());
        handle.abort();
    }

    #[test]
    fn test_start_without_runtime() {
        let service = ApiService::new(SocketAddr::from(([127, 0, 0, 1], 0)), Router::new());

        assert!(matches!(service.start(), Err(ApiServiceError::NoRuntime(_))));
        assert!(!service.is_started());
    }
}
