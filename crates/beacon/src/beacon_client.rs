use std::time::Duration;

use alloy_primitives::B256;
use async_trait::async_trait;
use futures::StreamExt;
use helix_common::{ProposerDuty, ValidatorSummary};
use reqwest_eventsource::EventSource;
use tokio::{sync::broadcast::Sender, time::sleep};
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    error::BeaconClientError,
    traits::BeaconClientTrait,
    types::{ApiResult, BeaconResponse, HeadEventData, StateId, SyncStatus},
};

/// Applies to plain requests only, SSE streams stay open.
const BEACON_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const SSE_RECONNECT_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Debug)]
pub struct BeaconClient {
    pub http: reqwest::Client,
    pub endpoint: Url,
}

impl BeaconClient {
    pub fn new(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn from_endpoint_str(endpoint: &str) -> Result<Self, BeaconClientError> {
        let endpoint = Url::parse(endpoint)?;
        let client = reqwest::Client::builder().timeout(BEACON_REQUEST_TIMEOUT).build()?;
        Ok(Self::new(client, endpoint))
    }

    pub async fn get<T: serde::Serialize + serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, BeaconClientError> {
        let result = self.http_get(path).await?.json().await?;
        match result {
            ApiResult::Ok(result) => Ok(result),
            ApiResult::Err(err) => Err(err.into()),
        }
    }

    pub async fn http_get(&self, path: &str) -> Result<reqwest::Response, BeaconClientError> {
        let target = self.endpoint.join(path)?;
        Ok(self.http.get(target).send().await?)
    }

    /// Subscribe to SSE events from the beacon client `events` endpoint.
    pub async fn subscribe_to_sse<T: serde::de::DeserializeOwned>(
        &self,
        topic: &str,
        chan: Sender<T>,
    ) -> Result<(), BeaconClientError> {
        let url = self.endpoint.join(&format!("eth/v1/events?topics={topic}"))?;

        loop {
            let mut es = EventSource::get(url.clone());

            while let Some(event) = es.next().await {
                match event {
                    Ok(reqwest_eventsource::Event::Message(message)) => {
                        match serde_json::from_str::<T>(&message.data) {
                            Ok(data) => {
                                if chan.send(data).is_err() {
                                    debug!(topic, "no subscribers left, closing SSE stream");
                                    es.close();
                                    return Err(BeaconClientError::HeadEventChannelClosed);
                                }
                            }
                            Err(err) => error!(err=%err, "Error parsing chunk"),
                        }
                    }
                    Ok(reqwest_eventsource::Event::Open) => {}
                    Err(err) => {
                        warn!(%err, endpoint = %self.endpoint, "SSE stream ended, reconnecting");
                        es.close();
                        break;
                    }
                }
            }
            sleep(SSE_RECONNECT_DELAY).await;
        }
    }
}

#[async_trait]
impl BeaconClientTrait for BeaconClient {
    async fn sync_status(&self) -> Result<SyncStatus, BeaconClientError> {
        let response: BeaconResponse<SyncStatus> = self.get("eth/v1/node/syncing").await?;
        Ok(response.data)
    }

    async fn current_slot(&self) -> Result<u64, BeaconClientError> {
        let sync_status = self.sync_status().await?;
        Ok(sync_status.head_slot)
    }

    async fn subscribe_to_head_events(
        &self,
        chan: Sender<HeadEventData>,
    ) -> Result<(), BeaconClientError> {
        self.subscribe_to_sse("head", chan).await
    }

    async fn get_state_validators(
        &self,
        state_id: StateId,
    ) -> Result<Vec<ValidatorSummary>, BeaconClientError> {
        let endpoint = format!("eth/v1/beacon/states/{state_id}/validators?status=active,pending");
        let result: BeaconResponse<Vec<ValidatorSummary>> = self.get(&endpoint).await?;
        Ok(result.data)
    }

    async fn get_proposer_duties(
        &self,
        epoch: u64,
    ) -> Result<(B256, Vec<ProposerDuty>), BeaconClientError> {
        let endpoint = format!("eth/v1/validator/duties/proposer/{epoch}");
        let mut result: BeaconResponse<Vec<ProposerDuty>> = self.get(&endpoint).await?;
        let dependent_root_value = result.meta.remove("dependent_root").ok_or_else(|| {
            BeaconClientError::MissingExpectedData(
                "missing `dependent_root` in response".to_string(),
            )
        })?;
        let dependent_root: B256 = serde_json::from_value(dependent_root_value)?;
        Ok((dependent_root, result.data))
    }

    fn get_uri(&self) -> String {
        self.endpoint.to_string()
    }
}
