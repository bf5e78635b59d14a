use std::sync::Arc;

use alloy_primitives::B256;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use helix_common::RouterConfig;
use helix_database::{mock_database_service::MockDatabaseService, DeliveredPayloadDocument};
use helix_datastore::{KnownValidatorCache, LocalRegistrationStore};
use helix_housekeeper::CurrentSlotInfo;
use helix_types::SignedValidatorRegistration;
use tower::ServiceExt;

use crate::{
    builder::BuilderApi,
    intake::registration_queue,
    proposer::ProposerApi,
    relay_data::{api::delivered_payloads_cache, DataApi},
    router::build_router,
    Api,
};

pub const TEST_BUILDER_DOMAIN: B256 = B256::repeat_byte(0x0b);

#[derive(Clone)]
pub struct MockApi;

impl Api for MockApi {
    type RegistrationStore = LocalRegistrationStore;
    type DatabaseService = MockDatabaseService;
}

/// Router wired to in-memory collaborators. No workers drain the intake queue, tests inspect
/// `queue` directly or spawn workers on it.
pub struct TestApp {
    pub router: Router,
    pub known_validators: Arc<KnownValidatorCache>,
    pub registrations: Arc<LocalRegistrationStore>,
    pub slot_info: CurrentSlotInfo,
    pub db: Arc<MockDatabaseService>,
    pub queue: crossbeam_channel::Receiver<SignedValidatorRegistration>,
}

pub fn app(intake_capacity: usize, delivered_payloads: Vec<DeliveredPayloadDocument>) -> TestApp {
    let known_validators = Arc::new(KnownValidatorCache::new());
    let registrations = Arc::new(LocalRegistrationStore::new());
    let slot_info = CurrentSlotInfo::new();
    let db = Arc::new(MockDatabaseService::new(delivered_payloads));
    let (intake, queue) = registration_queue(intake_capacity);

    let router = build_router::<MockApi>(
        &mut RouterConfig::default(),
        Arc::new(BuilderApi::new(slot_info.clone())),
        Arc::new(ProposerApi::new(known_validators.clone(), intake)),
        Arc::new(DataApi::<MockApi>::new(db.clone(), registrations.clone())),
        Arc::new(delivered_payloads_cache()),
    );

    TestApp { router, known_validators, registrations, slot_info, db, queue }
}

/// Sends a request through the router and returns the status with the body as text.
pub async fn send(router: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    send(router, Method::GET, uri, Body::empty()).await
}

pub async fn post_registrations(
    router: &Router,
    uri: &str,
    body: &[SignedValidatorRegistration],
) -> (StatusCode, String) {
    send(router, Method::POST, uri, Body::from(serde_json::to_vec(body).unwrap())).await
}
