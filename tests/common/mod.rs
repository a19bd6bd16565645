// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;

use koodai_partner::config::Config;
use koodai_partner::db::{FirestoreDb, MemoryKvStore};
use koodai_partner::routes::create_router;
use koodai_partner::services::notify::RecordingNotifier;
use koodai_partner::services::{DraftStore, Notifier, SimulatorRegistry, SubmissionCoordinator};
use koodai_partner::AppState;

/// Create a test app backed by the in-memory database.
/// Returns the router, the shared state, and the notification recorder.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>, Arc<RecordingNotifier>) {
    build_app(FirestoreDb::new_memory())
}

/// Create a test app whose database fails every operation.
#[allow(dead_code)]
pub fn create_test_app_offline() -> (Router, Arc<AppState>, Arc<RecordingNotifier>) {
    build_app(FirestoreDb::new_mock())
}

fn build_app(db: FirestoreDb) -> (Router, Arc<AppState>, Arc<RecordingNotifier>) {
    let config = Config::test_default();
    let drafts = DraftStore::new(Arc::new(MemoryKvStore::default()));
    let recorder = Arc::new(RecordingNotifier::default());
    let notifier: Arc<dyn Notifier> = recorder.clone();
    let simulators = SimulatorRegistry::new(notifier.clone());
    let submission = SubmissionCoordinator::new(db.clone());

    let state = Arc::new(AppState {
        config,
        db,
        drafts,
        simulators,
        submission,
        notifier,
    });

    (create_router(state.clone()), state, recorder)
}

/// Build a JSON request. `flow` adds the onboarding header, `session`
/// adds a bearer partner id.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    flow: Option<&str>,
    session: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");

    if let Some(phone) = flow {
        builder = builder.header("x-onboarding-phone", phone);
    }
    if let Some(partner_id) = session {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", partner_id));
    }

    builder
        .body(Body::from(body.to_string()))
        .expect("request build")
}

/// Build a bodyless request with optional gate headers.
#[allow(dead_code)]
pub fn bare_request(
    method: &str,
    uri: &str,
    flow: Option<&str>,
    session: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(phone) = flow {
        builder = builder.header("x-onboarding-phone", phone);
    }
    if let Some(partner_id) = session {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", partner_id));
    }

    builder.body(Body::empty()).expect("request build")
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}
