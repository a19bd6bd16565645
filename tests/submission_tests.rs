// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! End-to-end submission and login scenario tests.

use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use tower::ServiceExt;

mod common;

const PHONE: &str = "9876543210";

async fn fill_all_sections(app: &Router) {
    let sections = [
        (
            "/api/onboarding/identity",
            json!({
                "profile_photo": "data:image/jpeg;base64,aGk=",
                "name": "Arun Kumar",
                "house_no": "12A",
                "street": "2nd Cross Street",
                "area": "Anna Nagar",
                "landmark": "Near Tower Park",
                "city": "Chennai",
                "state": "Tamil Nadu",
                "pincode": "600040",
                "phone": PHONE
            }),
        ),
        (
            "/api/onboarding/permissions",
            json!({ "camera": true, "notifications": true, "location": true }),
        ),
        (
            "/api/onboarding/kyc",
            json!({
                "national_id": "data:image/jpeg;base64,aWQ=",
                "tax_id": "data:image/jpeg;base64,dGF4",
                "license": "data:image/jpeg;base64,ZGw="
            }),
        ),
        (
            "/api/onboarding/vehicle",
            json!({
                "vehicle_type": "bike",
                "plate": "TN 01 AB 1234",
                "model": "Splendor Plus",
                "license": "TN-01-2020-1234567"
            }),
        ),
        (
            "/api/onboarding/payment",
            json!({
                "bank_name": "State Bank",
                "holder_name": "Arun Kumar",
                "account_no": "123456789012",
                "confirm_account_no": "123456789012",
                "ifsc": "SBIN0001234"
            }),
        ),
    ];

    for (uri, body) in sections {
        let response = app
            .clone()
            .oneshot(common::json_request("PUT", uri, body, Some(PHONE), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "section {uri}");
    }
}

#[tokio::test]
async fn test_submit_incomplete_redirects_to_first_missing_step() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(common::bare_request(
            "POST",
            "/api/onboarding/submit",
            Some(PHONE),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "incomplete_draft");
    assert_eq!(body["details"], "step-1-identity");
}

#[tokio::test]
async fn test_submit_then_login_then_dashboard() {
    let (app, state, _) = common::create_test_app();
    fill_all_sections(&app).await;

    // Submit the completed application
    let response = app
        .clone()
        .oneshot(common::bare_request(
            "POST",
            "/api/onboarding/submit",
            Some(PHONE),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let partner_id = body["partner_id"].as_str().unwrap().to_string();
    assert_eq!(body["notification"]["title"], "Application submitted!");

    // Draft cleared after success
    let draft = state.drafts.get(PHONE).await.unwrap();
    assert!(draft.identity.is_none());

    // Stored with pending verification status
    let profile = state.db.get_partner(&partner_id).await.unwrap().unwrap();
    assert_eq!(
        serde_json::to_value(profile.status).unwrap(),
        json!("pending_verification")
    );

    // Login resolves the phone to the new partner record
    let response = app
        .clone()
        .oneshot(common::json_request(
            "POST",
            "/auth/otp/verify",
            json!({ "phone": PHONE, "otp": "123456" }),
            None,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["partner_id"], json!(partner_id));
    assert_eq!(body["next"], "/dashboard");

    // The session identifier opens the dashboard
    let response = app
        .oneshot(common::bare_request(
            "GET",
            "/api/me",
            None,
            Some(&partner_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["identity"]["name"], "Arun Kumar");
}

#[tokio::test]
async fn test_store_failure_preserves_draft_for_retry() {
    let (app, state, _) = common::create_test_app_offline();
    fill_all_sections(&app).await;

    let response = app
        .oneshot(common::bare_request(
            "POST",
            "/api/onboarding/submit",
            Some(PHONE),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "database_error");
    assert_eq!(body["details"], "Submission failed. Try again.");

    // No work lost: the draft is still complete
    let draft = state.drafts.get(PHONE).await.unwrap();
    assert!(draft.is_complete());
}
