// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Data models for the application.

pub mod draft;
pub mod order;
pub mod partner;

pub use draft::{Draft, DraftSection, Identity, KycDocuments, Payment, Permissions, Vehicle, VehicleType};
pub use order::{DailyStats, Order, OrderStatus};
pub use partner::{PartnerProfile, PartnerStatus};
