// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Pure field validators for the onboarding steps.
//!
//! One function per draft section, called synchronously before the
//! section is written into the draft store. Each returns the section
//! with normalization applied, or the list of human-readable reasons it
//! was rejected; callers surface the first reason and block advancement.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::draft::{Identity, KycDocuments, Payment, Permissions, Vehicle};

/// The fixed OTP accepted by the mock login flow. No real delivery.
pub const MOCK_OTP: &str = "123456";

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").unwrap());
static PINCODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{6}$").unwrap());
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z ]+$").unwrap());
// Matched against the uppercased, whitespace-collapsed form
static PLATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2} \d{1,2} [A-Z]{1,2} \d{3,4}$").unwrap());
// Matched against the uppercased, whitespace-stripped form
static LICENSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]{2}-\d{2}-\d{4}-\d{7}|[A-Z]{2}\d{13})$").unwrap());
static IFSC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").unwrap());
static ACCOUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{9,18}$").unwrap());
static UPI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]{2,64}@[A-Za-z]{2,32}$").unwrap());

/// Trim and collapse runs of whitespace to single spaces.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercase a plate and collapse its whitespace. Idempotent.
pub fn normalize_plate(input: &str) -> String {
    collapse_whitespace(input).to_uppercase()
}

/// Uppercase a license number and strip all whitespace. Idempotent.
pub fn normalize_license(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// A valid mobile number: exactly 10 digits, first digit 6-9.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Validate a mobile number, with the reason phrased for the user.
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err("Please enter your mobile number.".to_string());
    }
    if phone.len() != 10 {
        return Err("Please enter a valid 10-digit mobile number.".to_string());
    }
    if !is_valid_phone(phone) {
        return Err("Please enter a valid mobile number.".to_string());
    }
    Ok(())
}

/// Check an OTP against the fixed mock value.
///
/// A 6-digit value other than the mock literal is *incorrect*, not
/// malformed; anything else is rejected as invalid input.
pub fn check_otp(otp: &str) -> Result<(), String> {
    let otp = otp.trim();
    if otp.is_empty() {
        return Err("Please enter the 6-digit OTP.".to_string());
    }
    if otp.len() != 6 || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err("Please enter a valid 6-digit OTP.".to_string());
    }
    if otp != MOCK_OTP {
        return Err("Incorrect OTP.".to_string());
    }
    Ok(())
}

fn check_name(field: &str, value: &str, reasons: &mut Vec<String>) -> String {
    let normalized = collapse_whitespace(value);
    if normalized.is_empty() {
        reasons.push(format!("{field} is required."));
    } else if !NAME_RE.is_match(&normalized) {
        reasons.push(format!("{field} may contain only letters and spaces."));
    }
    normalized
}

fn check_required(field: &str, value: &str, reasons: &mut Vec<String>) -> String {
    let normalized = collapse_whitespace(value);
    if normalized.is_empty() {
        reasons.push(format!("{field} is required."));
    }
    normalized
}

/// Validate and normalize the identity section.
pub fn validate_identity(mut input: Identity) -> Result<Identity, Vec<String>> {
    let mut reasons = Vec::new();

    if input.profile_photo.trim().is_empty() {
        reasons.push("Profile photo is required.".to_string());
    }
    input.name = check_name("Full name", &input.name, &mut reasons);
    input.house_no = check_required("House number", &input.house_no, &mut reasons);
    input.street = check_required("Street", &input.street, &mut reasons);
    input.area = check_required("Area", &input.area, &mut reasons);
    input.landmark = collapse_whitespace(&input.landmark);
    input.city = check_name("City", &input.city, &mut reasons);
    input.state = check_name("State", &input.state, &mut reasons);

    input.pincode = input.pincode.trim().to_string();
    if !PINCODE_RE.is_match(&input.pincode) {
        reasons.push("Please enter a valid 6-digit pincode.".to_string());
    }

    if let Err(reason) = validate_phone(&input.phone) {
        reasons.push(reason);
    }
    input.phone = input.phone.trim().to_string();

    if let Some(emergency) = &input.emergency {
        let emergency = emergency.trim().to_string();
        if emergency.is_empty() {
            input.emergency = None;
        } else {
            if !is_valid_phone(&emergency) {
                reasons.push("Please enter a valid emergency contact number.".to_string());
            }
            input.emergency = Some(emergency);
        }
    }

    if let Some(email) = &input.email {
        let email = email.trim().to_string();
        if email.is_empty() {
            input.email = None;
        } else {
            // Light shape check only; email is optional and unverified
            if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
                reasons.push("Please enter a valid email address.".to_string());
            }
            input.email = Some(email);
        }
    }

    if reasons.is_empty() {
        Ok(input)
    } else {
        Err(reasons)
    }
}

/// The permissions section has no malformed state; pass it through.
pub fn validate_permissions(input: Permissions) -> Result<Permissions, Vec<String>> {
    Ok(input)
}

/// Validate the KYC section: all three documents must be present.
pub fn validate_kyc(input: KycDocuments) -> Result<KycDocuments, Vec<String>> {
    let mut reasons = Vec::new();

    if input.national_id.trim().is_empty() {
        reasons.push("National ID document is required.".to_string());
    }
    if input.tax_id.trim().is_empty() {
        reasons.push("Tax ID document is required.".to_string());
    }
    if input.license.trim().is_empty() {
        reasons.push("License document is required.".to_string());
    }

    if reasons.is_empty() {
        Ok(input)
    } else {
        Err(reasons)
    }
}

/// Validate and normalize the vehicle section.
pub fn validate_vehicle(mut input: Vehicle) -> Result<Vehicle, Vec<String>> {
    let mut reasons = Vec::new();

    input.plate = normalize_plate(&input.plate);
    if !PLATE_RE.is_match(&input.plate) {
        reasons.push("Please enter a valid vehicle plate (e.g. TN 01 AB 1234).".to_string());
    }

    input.model = check_required("Vehicle model", &input.model, &mut reasons);

    input.license = normalize_license(&input.license);
    if !LICENSE_RE.is_match(&input.license) {
        reasons.push("Please enter a valid driving license number.".to_string());
    }

    if reasons.is_empty() {
        Ok(input)
    } else {
        Err(reasons)
    }
}

/// Validate and normalize the payment section.
///
/// `confirm_account_no` must match the account number by exact string
/// equality; it is compared unnormalized.
pub fn validate_payment(
    mut input: Payment,
    confirm_account_no: &str,
) -> Result<Payment, Vec<String>> {
    let mut reasons = Vec::new();

    input.bank_name = check_name("Bank name", &input.bank_name, &mut reasons);
    input.holder_name = check_name("Account holder name", &input.holder_name, &mut reasons);

    if !ACCOUNT_RE.is_match(&input.account_no) {
        reasons.push("Account number must be 9 to 18 digits.".to_string());
    }
    if input.account_no != confirm_account_no {
        reasons.push("Account numbers do not match.".to_string());
    }

    input.ifsc = input.ifsc.trim().to_uppercase();
    if !IFSC_RE.is_match(&input.ifsc) {
        reasons.push("Please enter a valid IFSC code (e.g. SBIN0001234).".to_string());
    }

    if let Some(upi) = &input.upi {
        let upi = upi.trim().to_string();
        if upi.is_empty() {
            input.upi = None;
        } else {
            if !UPI_RE.is_match(&upi) {
                reasons.push("Please enter a valid UPI ID (e.g. username@bank).".to_string());
            }
            input.upi = Some(upi);
        }
    }

    if reasons.is_empty() {
        Ok(input)
    } else {
        Err(reasons)
    }
}
