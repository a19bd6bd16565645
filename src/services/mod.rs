// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Services module - business logic layer.

pub mod draft_store;
pub mod image;
pub mod notify;
pub mod offers;
pub mod stats;
pub mod submission;

pub use draft_store::DraftStore;
pub use notify::{LogNotifier, Notification, Notifier, Severity};
pub use offers::{OfferSimulator, OfferSnapshot, OfferState, SimulatorRegistry};
pub use submission::SubmissionCoordinator;
