// SPDX-License-Identifier: MIT
// Copyright 2026 Koodai Delivery <dev@koodai.app>

//! Onboarding step routes.
//!
//! Each step validates its section before it is written into the draft
//! store; the first failing reason is surfaced and advancement blocked.
//! The flow is scoped by the phone verified at signup, which also keys
//! the persisted draft.

use axum::{
    extract::{Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::session::{OnboardingFlow, ONBOARDING_COOKIE};
use crate::models::{Draft, DraftSection, Identity, KycDocuments, Payment, Permissions, Vehicle};
use crate::services::image::{normalize_upload, INSURANCE_IMAGE_LIMIT, KYC_IMAGE_LIMIT};
use crate::services::notify::Notification;
use crate::validate;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/onboarding", get(progress).delete(abandon))
        .route("/api/onboarding/identity", put(put_identity))
        .route("/api/onboarding/permissions", put(put_permissions))
        .route("/api/onboarding/kyc", put(put_kyc))
        .route("/api/onboarding/vehicle", put(put_vehicle))
        .route("/api/onboarding/payment", put(put_payment))
        .route("/api/onboarding/upload", post(upload))
        .route("/api/onboarding/submit", post(submit))
}

// ─── Progress ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProgressResponse {
    identity: bool,
    permissions: bool,
    kyc: bool,
    vehicle: bool,
    payment: bool,
    complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_step: Option<&'static str>,
}

impl ProgressResponse {
    fn from_draft(draft: &Draft) -> Self {
        Self {
            identity: draft.identity.is_some(),
            permissions: draft.permissions.is_some(),
            kyc: draft.kyc.is_some(),
            vehicle: draft.vehicle.is_some(),
            payment: draft.payment.is_some(),
            complete: draft.is_complete(),
            next_step: draft.first_missing_step(),
        }
    }
}

async fn progress(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
) -> Result<Json<ProgressResponse>> {
    let draft = state.drafts.get(&flow.phone).await?;
    Ok(Json(ProgressResponse::from_draft(&draft)))
}

/// Abandon the application: drop the draft and its persisted state.
async fn abandon(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ProgressResponse>)> {
    state.drafts.reset(&flow.phone).await?;
    let jar = jar.remove(clear_cookie());
    Ok((jar, Json(ProgressResponse::from_draft(&Draft::default()))))
}

// ─── Section Steps ───────────────────────────────────────────────

fn first_reason(reasons: Vec<String>) -> AppError {
    AppError::Validation(
        reasons
            .into_iter()
            .next()
            .unwrap_or_else(|| "Invalid input".to_string()),
    )
}

async fn save_section(
    state: &AppState,
    flow: &OnboardingFlow,
    section: DraftSection,
) -> Result<Json<ProgressResponse>> {
    let draft = state.drafts.set_section(&flow.phone, section).await?;
    Ok(Json(ProgressResponse::from_draft(&draft)))
}

async fn put_identity(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    Json(input): Json<Identity>,
) -> Result<Json<ProgressResponse>> {
    let identity = validate::validate_identity(input).map_err(first_reason)?;
    // The draft belongs to the number verified at signup
    if identity.phone != flow.phone {
        return Err(AppError::Validation(
            "Phone must match the verified mobile number.".to_string(),
        ));
    }
    save_section(&state, &flow, DraftSection::Identity(identity)).await
}

async fn put_permissions(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    Json(input): Json<Permissions>,
) -> Result<Json<ProgressResponse>> {
    let permissions = validate::validate_permissions(input).map_err(first_reason)?;
    save_section(&state, &flow, DraftSection::Permissions(permissions)).await
}

async fn put_kyc(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    Json(input): Json<KycDocuments>,
) -> Result<Json<ProgressResponse>> {
    let kyc = validate::validate_kyc(input).map_err(first_reason)?;
    save_section(&state, &flow, DraftSection::Kyc(kyc)).await
}

async fn put_vehicle(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    Json(input): Json<Vehicle>,
) -> Result<Json<ProgressResponse>> {
    let vehicle = validate::validate_vehicle(input).map_err(first_reason)?;
    save_section(&state, &flow, DraftSection::Vehicle(vehicle)).await
}

#[derive(Deserialize)]
pub struct PaymentRequest {
    #[serde(flatten)]
    payment: Payment,
    confirm_account_no: String,
}

async fn put_payment(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    Json(input): Json<PaymentRequest>,
) -> Result<Json<ProgressResponse>> {
    let payment = validate::validate_payment(input.payment, &input.confirm_account_no)
        .map_err(first_reason)?;
    save_section(&state, &flow, DraftSection::Payment(payment)).await
}

// ─── Uploads ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Profile,
    Kyc,
    Insurance,
}

impl UploadKind {
    fn byte_limit(&self) -> usize {
        match self {
            UploadKind::Profile | UploadKind::Kyc => KYC_IMAGE_LIMIT,
            UploadKind::Insurance => INSURANCE_IMAGE_LIMIT,
        }
    }
}

#[derive(Deserialize)]
pub struct UploadParams {
    kind: UploadKind,
}

#[derive(Deserialize)]
pub struct UploadRequest {
    content_type: String,
    data_base64: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    data_url: String,
}

/// Normalize an uploaded file into a storable data URL.
async fn upload(
    Extension(_flow): Extension<OnboardingFlow>,
    Query(params): Query<UploadParams>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let bytes = BASE64
        .decode(req.data_base64.as_bytes())
        .map_err(|_| AppError::BadRequest("Invalid base64 upload".to_string()))?;

    let data_url = normalize_upload(bytes, &req.content_type, params.kind.byte_limit()).await?;

    Ok(Json(UploadResponse { data_url }))
}

// ─── Submission ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SubmitResponse {
    partner_id: String,
    notification: Notification,
}

/// Submit the completed application.
async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(flow): Extension<OnboardingFlow>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SubmitResponse>)> {
    let partner_id = state.submission.submit(&state.drafts, &flow.phone).await?;

    // The flow is over; the applicant logs in once verification passes
    let jar = jar.remove(clear_cookie());

    Ok((
        jar,
        Json(SubmitResponse {
            partner_id,
            notification: Notification::success(
                "Application submitted!",
                Some("Your profile is under verification."),
            ),
        }),
    ))
}

fn clear_cookie() -> Cookie<'static> {
    Cookie::build((ONBOARDING_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
}
