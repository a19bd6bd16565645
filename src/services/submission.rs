// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Submission coordinator.
//!
//! Assembles the completed draft into one partner application document,
//! enforces the serialized-size ceiling, hands it to the document store,
//! and clears the draft only after the write succeeds. The ceiling
//! exists because encoded images are embedded inline rather than
//! referenced.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{PartnerProfile, PartnerStatus};
use crate::services::draft_store::DraftStore;
use crate::time_utils::format_utc_rfc3339;

/// Serialized application documents may not exceed this many bytes.
pub const MAX_PAYLOAD_BYTES: usize = 950_000;

pub struct SubmissionCoordinator {
    db: FirestoreDb,
}

impl SubmissionCoordinator {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Submit the draft stored under `key`.
    ///
    /// Fails without touching the store when a section is missing or the
    /// payload exceeds the ceiling; on store failure the draft is left
    /// intact so the user can retry. Returns the new partner document ID.
    pub async fn submit(&self, drafts: &DraftStore, key: &str) -> Result<String> {
        let draft = drafts.get(key).await?;

        if let Some(missing_step) = draft.first_missing_step() {
            return Err(AppError::IncompleteDraft { missing_step });
        }

        // first_missing_step() == None guarantees every section is present
        let profile = PartnerProfile {
            id: None,
            identity: draft.identity.clone().ok_or_else(section_guard)?,
            permissions: draft.permissions.ok_or_else(section_guard)?,
            kyc: draft.kyc.clone().ok_or_else(section_guard)?,
            vehicle: draft.vehicle.clone().ok_or_else(section_guard)?,
            payment: draft.payment.clone().ok_or_else(section_guard)?,
            status: PartnerStatus::PendingVerification,
            created_at: format_utc_rfc3339(chrono::Utc::now()),
        };

        let serialized = serde_json::to_vec(&profile)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize draft: {}", e)))?;
        if serialized.len() > MAX_PAYLOAD_BYTES {
            return Err(AppError::PayloadTooLarge {
                size: serialized.len(),
                limit: MAX_PAYLOAD_BYTES,
            });
        }

        let partner_id = self.db.create_partner(&profile).await?;

        tracing::info!(
            partner_id = %partner_id,
            payload_bytes = serialized.len(),
            "Partner application submitted"
        );

        // Only now is it safe to drop the draft
        drafts.reset(key).await?;

        Ok(partner_id)
    }
}

fn section_guard() -> AppError {
    AppError::Internal(anyhow::anyhow!("Draft section vanished during submission"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryKvStore;
    use crate::models::draft::*;
    use std::sync::Arc;

    fn drafts() -> DraftStore {
        DraftStore::new(Arc::new(MemoryKvStore::default()))
    }

    fn identity() -> Identity {
        Identity {
            profile_photo: "data:image/jpeg;base64,aGk=".to_string(),
            name: "Arun Kumar".to_string(),
            house_no: "12A".to_string(),
            street: "2nd Cross Street".to_string(),
            area: "Anna Nagar".to_string(),
            landmark: "".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600040".to_string(),
            emergency: None,
            phone: "9876543210".to_string(),
            email: None,
        }
    }

    async fn fill_complete(drafts: &DraftStore, key: &str) {
        drafts
            .set_section(key, DraftSection::Identity(identity()))
            .await
            .unwrap();
        drafts
            .set_section(
                key,
                DraftSection::Permissions(Permissions {
                    camera: true,
                    notifications: true,
                    location: true,
                }),
            )
            .await
            .unwrap();
        drafts
            .set_section(
                key,
                DraftSection::Kyc(KycDocuments {
                    national_id: "data:image/jpeg;base64,aWQ=".to_string(),
                    tax_id: "data:image/jpeg;base64,dGF4".to_string(),
                    license: "data:image/jpeg;base64,ZGw=".to_string(),
                }),
            )
            .await
            .unwrap();
        drafts
            .set_section(
                key,
                DraftSection::Vehicle(Vehicle {
                    vehicle_type: VehicleType::Bike,
                    plate: "TN 01 AB 1234".to_string(),
                    model: "Splendor Plus".to_string(),
                    license: "TN-01-2020-1234567".to_string(),
                    insurance_image: None,
                }),
            )
            .await
            .unwrap();
        drafts
            .set_section(
                key,
                DraftSection::Payment(Payment {
                    bank_name: "State Bank".to_string(),
                    holder_name: "Arun Kumar".to_string(),
                    account_no: "123456789012".to_string(),
                    ifsc: "SBIN0001234".to_string(),
                    upi: None,
                }),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_submit_creates_once_and_clears_draft() {
        let db = FirestoreDb::new_memory();
        let drafts = drafts();
        fill_complete(&drafts, "9876543210").await;

        let coordinator = SubmissionCoordinator::new(db.clone());
        let partner_id = coordinator.submit(&drafts, "9876543210").await.unwrap();

        let stored = db.get_partner(&partner_id).await.unwrap().unwrap();
        assert_eq!(stored.status, PartnerStatus::PendingVerification);
        assert_eq!(stored.identity.phone, "9876543210");
        assert!(!stored.created_at.is_empty());

        // Draft cleared after success
        let draft = drafts.get("9876543210").await.unwrap();
        assert!(draft.identity.is_none());

        // Exactly one partner document exists for the phone
        assert!(db.find_partner_by_phone("9876543210").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_missing_section_blocks_before_any_store_call() {
        // Offline db errors on any operation, so reaching it would fail
        // the test with a Database error instead of IncompleteDraft
        let db = FirestoreDb::new_mock();
        let drafts = drafts();
        drafts
            .set_section("9876543210", DraftSection::Identity(identity()))
            .await
            .unwrap();

        let coordinator = SubmissionCoordinator::new(db);
        let err = coordinator.submit(&drafts, "9876543210").await.unwrap_err();

        match err {
            AppError::IncompleteDraft { missing_step } => {
                assert_eq!(missing_step, "step-2-permissions");
            }
            other => panic!("expected IncompleteDraft, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oversized_payload_blocks_before_any_store_call() {
        let db = FirestoreDb::new_mock();
        let drafts = drafts();
        fill_complete(&drafts, "9876543210").await;

        // Push the serialized profile past the ceiling
        let mut big = identity();
        big.profile_photo = format!("data:image/jpeg;base64,{}", "A".repeat(MAX_PAYLOAD_BYTES));
        drafts
            .set_section("9876543210", DraftSection::Identity(big))
            .await
            .unwrap();

        let coordinator = SubmissionCoordinator::new(db);
        let err = coordinator.submit(&drafts, "9876543210").await.unwrap_err();

        match err {
            AppError::PayloadTooLarge { size, limit } => {
                assert!(size > limit);
                assert_eq!(limit, MAX_PAYLOAD_BYTES);
            }
            other => panic!("expected PayloadTooLarge, got {other:?}"),
        }

        // Draft untouched
        let draft = drafts.get("9876543210").await.unwrap();
        assert!(draft.is_complete());
    }

    #[tokio::test]
    async fn test_store_failure_preserves_draft() {
        let db = FirestoreDb::new_mock(); // every write fails
        let drafts = drafts();
        fill_complete(&drafts, "9876543210").await;

        let coordinator = SubmissionCoordinator::new(db);
        let err = coordinator.submit(&drafts, "9876543210").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        // The user loses no work and can retry
        let draft = drafts.get("9876543210").await.unwrap();
        assert!(draft.is_complete());
    }
}
