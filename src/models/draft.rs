//! Onboarding draft aggregate and its section models.

use serde::{Deserialize, Serialize};

/// Step 1: identity and address details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Profile photo as a self-contained data URL
    pub profile_photo: String,
    pub name: String,
    pub house_no: String,
    pub street: String,
    pub area: String,
    pub landmark: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// Emergency contact phone (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emergency: Option<String>,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Step 2: device permission acknowledgements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Permissions {
    pub camera: bool,
    pub notifications: bool,
    pub location: bool,
}

/// Step 3: encoded KYC documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KycDocuments {
    /// National ID document (data URL)
    pub national_id: String,
    /// Tax ID document (data URL)
    pub tax_id: String,
    /// Driving license document (data URL)
    pub license: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Scooter,
    Cycle,
    Ev,
}

/// Step 4: vehicle details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_type: VehicleType,
    pub plate: String,
    pub model: String,
    pub license: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_image: Option<String>,
}

/// Step 5: payout details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub bank_name: String,
    pub holder_name: String,
    pub account_no: String,
    pub ifsc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi: Option<String>,
}

/// A validated section ready to be written into the draft.
///
/// Sections are replaced wholesale; there is no partial merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum DraftSection {
    Identity(Identity),
    Permissions(Permissions),
    Kyc(KycDocuments),
    Vehicle(Vehicle),
    Payment(Payment),
}

/// The accumulating, not-yet-submitted onboarding record.
///
/// A section is `Some` only after its validator has passed; final
/// submission requires all five sections present simultaneously.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub identity: Option<Identity>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
    #[serde(default)]
    pub kyc: Option<KycDocuments>,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    #[serde(default)]
    pub payment: Option<Payment>,
}

impl Draft {
    /// Replace one section wholesale.
    pub fn set_section(&mut self, section: DraftSection) {
        match section {
            DraftSection::Identity(data) => self.identity = Some(data),
            DraftSection::Permissions(data) => self.permissions = Some(data),
            DraftSection::Kyc(data) => self.kyc = Some(data),
            DraftSection::Vehicle(data) => self.vehicle = Some(data),
            DraftSection::Payment(data) => self.payment = Some(data),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.first_missing_step().is_none()
    }

    /// The first incomplete step in onboarding order, if any.
    ///
    /// Step order follows the onboarding flow: identity, permissions,
    /// KYC, vehicle, payment.
    pub fn first_missing_step(&self) -> Option<&'static str> {
        if self.identity.is_none() {
            Some("step-1-identity")
        } else if self.permissions.is_none() {
            Some("step-2-permissions")
        } else if self.kyc.is_none() {
            Some("step-3-kyc")
        } else if self.vehicle.is_none() {
            Some("step-4-vehicle")
        } else if self.payment.is_none() {
            Some("step-5-payment")
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity() -> Identity {
        Identity {
            profile_photo: "data:image/jpeg;base64,aGk=".to_string(),
            name: "Arun Kumar".to_string(),
            house_no: "12A".to_string(),
            street: "2nd Cross Street".to_string(),
            area: "Anna Nagar".to_string(),
            landmark: "Near Tower Park".to_string(),
            city: "Chennai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "600040".to_string(),
            emergency: None,
            phone: "9876543210".to_string(),
            email: None,
        }
    }

    #[test]
    fn test_first_missing_step_follows_flow_order() {
        let mut draft = Draft::default();
        assert_eq!(draft.first_missing_step(), Some("step-1-identity"));

        draft.set_section(DraftSection::Identity(test_identity()));
        assert_eq!(draft.first_missing_step(), Some("step-2-permissions"));

        // Completing a later step does not satisfy an earlier one
        draft.set_section(DraftSection::Payment(Payment {
            bank_name: "State Bank".to_string(),
            holder_name: "Arun Kumar".to_string(),
            account_no: "123456789012".to_string(),
            ifsc: "SBIN0001234".to_string(),
            upi: None,
        }));
        assert_eq!(draft.first_missing_step(), Some("step-2-permissions"));
    }

    #[test]
    fn test_set_section_replaces_wholesale() {
        let mut draft = Draft::default();
        let mut identity = test_identity();
        identity.emergency = Some("9123456780".to_string());
        draft.set_section(DraftSection::Identity(identity));

        // A replacement without the optional field drops it entirely
        draft.set_section(DraftSection::Identity(test_identity()));
        assert!(draft.identity.as_ref().unwrap().emergency.is_none());
    }
}
