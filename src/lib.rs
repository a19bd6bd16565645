// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Koodai Partner: backend core for the delivery-partner app
//!
//! This crate provides the onboarding flow (draft store, validators,
//! image normalization, submission) and the dashboard's order-offer
//! simulator and daily stats, backed by Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validate;

use std::sync::Arc;

use config::Config;
use db::FirestoreDb;
use services::{DraftStore, Notifier, SimulatorRegistry, SubmissionCoordinator};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub drafts: DraftStore,
    pub simulators: SimulatorRegistry,
    pub submission: SubmissionCoordinator,
    pub notifier: Arc<dyn Notifier>,
}
