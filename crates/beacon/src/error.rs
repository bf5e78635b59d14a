use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum BeaconClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("beacon api error: {0}")]
    Api(#[from] ApiError),

    #[error("missing expected data in response: {0}")]
    MissingExpectedData(String),

    #[error("beacon node unavailable")]
    BeaconNodeUnavailable,

    /// Every node errored or reported syncing. Callers retry on their next tick.
    #[error("beacon node syncing")]
    BeaconNodeSyncing,

    #[error("head event channel closed")]
    HeadEventChannelClosed,
}

/// Error body returned by the standard beacon API, `failures` of indexed errors is ignored.
#[derive(Serialize, Deserialize, Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}
