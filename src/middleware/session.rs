// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Session-gate middleware.
//!
//! Dashboard access is gated purely on possession of a stored partner
//! identifier; nothing is verified against an authority. The onboarding
//! flow is gated the same way on the phone number verified at signup,
//! which also keys the applicant's draft.

use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::error::AppError;

/// Cookie carrying the opaque partner identifier after login.
pub const PARTNER_COOKIE: &str = "partner_id";
/// Cookie carrying the verified phone during onboarding.
pub const ONBOARDING_COOKIE: &str = "onboarding_phone";

/// Header fallback for the onboarding flow context.
pub const ONBOARDING_HEADER: &str = "x-onboarding-phone";

/// Partner session extracted from the request.
#[derive(Debug, Clone)]
pub struct SessionPartner {
    pub partner_id: String,
}

/// Onboarding flow context extracted from the request.
#[derive(Debug, Clone)]
pub struct OnboardingFlow {
    pub phone: String,
}

/// Middleware that requires a partner session identifier.
pub async fn require_partner(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let partner_id = if let Some(cookie) = jar.get(PARTNER_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header {
            Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
            _ => return Err(AppError::Unauthorized),
        }
    };

    if partner_id.is_empty() {
        return Err(AppError::Unauthorized);
    }

    request
        .extensions_mut()
        .insert(SessionPartner { partner_id });

    Ok(next.run(request).await)
}

/// Middleware that requires an active onboarding flow.
pub async fn require_onboarding(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let phone = if let Some(cookie) = jar.get(ONBOARDING_COOKIE) {
        cookie.value().to_string()
    } else {
        match request
            .headers()
            .get(ONBOARDING_HEADER)
            .and_then(|h| h.to_str().ok())
        {
            Some(value) => value.to_string(),
            None => return Err(AppError::Unauthorized),
        }
    };

    if phone.is_empty() {
        return Err(AppError::Unauthorized);
    }

    request.extensions_mut().insert(OnboardingFlow { phone });

    Ok(next.run(request).await)
}
