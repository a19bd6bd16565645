// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Mock phone/OTP authentication routes.
//!
//! No OTP is ever delivered: the fixed mock value is accepted and the
//! response tells the tester what it is. Login resolves the verified
//! phone to a partner document and hands back its id as the session
//! identifier; signup opens an onboarding flow scoped to the phone.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::session::{ONBOARDING_COOKIE, PARTNER_COOKIE};
use crate::services::notify::Notification;
use crate::validate::{check_otp, validate_phone, MOCK_OTP};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/otp/send", post(send_otp))
        .route("/auth/otp/verify", post(verify_otp))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct SendOtpRequest {
    phone: String,
}

#[derive(Serialize)]
pub struct SendOtpResponse {
    sent: bool,
    notification: Notification,
}

/// Validate the phone and "send" the mock OTP.
async fn send_otp(Json(req): Json<SendOtpRequest>) -> Result<Json<SendOtpResponse>> {
    validate_phone(&req.phone).map_err(AppError::Validation)?;

    tracing::info!(phone = %req.phone, "Mock OTP issued");

    Ok(Json(SendOtpResponse {
        sent: true,
        notification: Notification::success(
            "OTP Sent Successfully!",
            Some(&format!("OTP: {} (Mock)", MOCK_OTP)),
        ),
    }))
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    phone: String,
    otp: String,
    #[serde(default)]
    signup: bool,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    partner_id: Option<String>,
    /// Where the client should go next
    next: &'static str,
    notification: Notification,
}

/// Verify the OTP and open a session (login) or onboarding flow (signup).
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<VerifyOtpResponse>)> {
    validate_phone(&req.phone).map_err(AppError::Validation)?;
    check_otp(&req.otp).map_err(AppError::Validation)?;

    if req.signup {
        let jar = jar.add(flow_cookie(ONBOARDING_COOKIE, &req.phone));

        return Ok((
            jar,
            Json(VerifyOtpResponse {
                partner_id: None,
                next: "/onboarding/step-1",
                notification: Notification::success(
                    "Mobile Verified!",
                    Some("Proceeding to onboarding..."),
                ),
            }),
        ));
    }

    let profile = state
        .db
        .find_partner_by_phone(&req.phone)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No partner account found for this number".to_string())
        })?;
    let partner_id = profile
        .id
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Partner document has no id")))?;

    tracing::info!(partner_id = %partner_id, "Partner logged in");

    let jar = jar.add(flow_cookie(PARTNER_COOKIE, &partner_id));

    Ok((
        jar,
        Json(VerifyOtpResponse {
            partner_id: Some(partner_id),
            next: "/dashboard",
            notification: Notification::success("Login Successful!", Some("Welcome back!")),
        }),
    ))
}

#[derive(Serialize)]
pub struct LogoutResponse {
    notification: Notification,
}

/// Clear the session and any onboarding flow.
async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar
        .remove(flow_cookie(PARTNER_COOKIE, ""))
        .remove(flow_cookie(ONBOARDING_COOKIE, ""));

    (
        jar,
        Json(LogoutResponse {
            notification: Notification::info("Logged out successfully", None),
        }),
    )
}

fn flow_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .path("/")
        .http_only(true)
        .build()
}
