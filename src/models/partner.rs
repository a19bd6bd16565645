//! Partner profile model for storage and API.

use serde::{Deserialize, Serialize};

use crate::models::draft::{Identity, KycDocuments, Payment, Permissions, Vehicle};

/// Verification status of a submitted partner application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerStatus {
    PendingVerification,
    Verified,
    Rejected,
}

/// Submitted partner profile stored in the `delivery` collection.
///
/// This is the completed draft plus submission metadata; encoded KYC and
/// profile images are embedded inline as data URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerProfile {
    /// Document ID, populated on reads
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: Option<String>,
    pub identity: Identity,
    pub permissions: Permissions,
    pub kyc: KycDocuments,
    pub vehicle: Vehicle,
    pub payment: Payment,
    pub status: PartnerStatus,
    /// When the application was submitted (RFC3339, assigned server-side)
    pub created_at: String,
}
