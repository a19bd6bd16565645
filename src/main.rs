// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Koodai Partner API Server
//!
//! Serves the delivery-partner onboarding flow and the dashboard's
//! simulated order lifecycle against Firestore.

use koodai_partner::{
    config::Config,
    db::{FileKvStore, FirestoreDb},
    services::{DraftStore, LogNotifier, Notifier, SimulatorRegistry, SubmissionCoordinator},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Koodai Partner API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Local persistence for onboarding drafts
    let kv = FileKvStore::load(&config.draft_store_path)
        .await
        .expect("Failed to load draft store");
    let drafts = DraftStore::new(Arc::new(kv));
    tracing::info!(path = %config.draft_store_path, "Draft store loaded");

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let simulators = SimulatorRegistry::new(notifier.clone());
    let submission = SubmissionCoordinator::new(db.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        drafts,
        simulators,
        submission,
        notifier,
    });

    // Build router
    let app = koodai_partner::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("koodai_partner=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
