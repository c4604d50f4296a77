use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use referra_core::referrals::{
    Conversion, ConversionDetails, Referral, ReferralIdent, ReferralInvite,
};
use referra_core::users::RoleKind;
use referra_core::Error;

use crate::auth::AuthActor;
use crate::error::ApiResult;
use crate::main_lib::AppState;

// ---------------------------------------------------------------------------
// Authenticated referral API
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateLinkRequest {
    campaign_id: String,
    custom_message: Option<String>,
}

async fn generate_link(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateLinkRequest>,
) -> ApiResult<Json<ReferralInvite>> {
    let invite = state
        .referral_service
        .generate_link(&actor, &request.campaign_id, request.custom_message)
        .await?;
    Ok(Json(invite))
}

async fn list_referrals(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Referral>>> {
    let referrals = match actor.role {
        RoleKind::Business => state.referral_service.get_referrals_for_business(&actor)?,
        _ => state.referral_service.get_referrals_for_referrer(&actor)?,
    };
    Ok(Json(referrals))
}

async fn get_referral(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Referral>> {
    Ok(Json(state.referral_service.get_referral(&actor, &id)?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectRequest {
    reason: String,
}

async fn reject_referral(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<RejectRequest>,
) -> ApiResult<Json<Referral>> {
    let referral = state
        .referral_service
        .reject_referral(&actor, &id, &request.reason)
        .await?;
    Ok(Json(referral))
}

async fn expire_referral(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Referral>> {
    let referral = state.referral_service.expire_referral(&actor, &id).await?;
    Ok(Json(referral))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/referrals/generate-link", post(generate_link))
        .route("/referrals", get(list_referrals))
        .route("/referrals/{id}", get(get_referral))
        .route("/referrals/{id}/reject", post(reject_referral))
        .route("/referrals/{id}/expire", post(expire_referral))
}

// ---------------------------------------------------------------------------
// Public share-link surface (no account required: the prospect is a stranger)
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LandingResponse {
    business_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    referral_code: Option<String>,
}

/// `/r/{code}`: the canonical share link. Records one click event.
async fn click_share_link(
    Path(code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LandingResponse>> {
    let referral = state.referral_service.track_click(&code).await?;
    let business = state.user_repository.get_by_id(&referral.business_id)?;
    Ok(Json(LandingResponse {
        business_name: business.name,
        referral_code: Some(referral.referral_code),
    }))
}

/// `/refer/{businessCode}`: a bare business landing. Nothing attributable to
/// a referrer, so no ledger mutation happens here.
async fn business_landing(
    Path(business_code): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LandingResponse>> {
    let business = state.user_repository.get_by_business_code(&business_code)?;
    Ok(Json(LandingResponse {
        business_name: business.name,
        referral_code: None,
    }))
}

/// `/refer/{businessCode}/{referrerCode}`: a referrer's company link.
/// Finds or creates the open referral for the default campaign and records
/// the click on it.
async fn referrer_landing(
    Path((business_code, referrer_code)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<LandingResponse>> {
    let business = state.user_repository.get_by_business_code(&business_code)?;
    let referrer = state.user_repository.get_by_referrer_code(&referrer_code)?;
    let campaign = state
        .campaign_service
        .get_default_campaign(&business.id)?
        .ok_or_else(|| {
            Error::NotFound(format!("no active campaign for business {}", business_code))
        })?;

    let referral = state
        .referral_service
        .open_referral_for(&campaign.id, &referrer.id)
        .await?;
    let clicked = state
        .referral_service
        .track_click(&referral.referral_code)
        .await?;
    Ok(Json(LandingResponse {
        business_name: business.name,
        referral_code: Some(clicked.referral_code),
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReferralRequest {
    business_code: String,
    referrer_code: String,
    name: String,
    email: String,
    phone: Option<String>,
    notes: Option<String>,
    purchase_amount: Option<Decimal>,
    transaction_id: Option<String>,
}

/// The conversion form behind the landing flow.
async fn submit_referral(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitReferralRequest>,
) -> ApiResult<Json<Conversion>> {
    let business = state
        .user_repository
        .get_by_business_code(&request.business_code)?;
    let referrer = state
        .user_repository
        .get_by_referrer_code(&request.referrer_code)?;
    let campaign = state
        .campaign_service
        .get_default_campaign(&business.id)?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "no active campaign for business {}",
                request.business_code
            ))
        })?;

    let referral = state
        .referral_service
        .open_referral_for(&campaign.id, &referrer.id)
        .await?;
    let conversion = state
        .referral_service
        .submit_conversion(
            ReferralIdent::Id(referral.id),
            ConversionDetails {
                name: request.name,
                email: request.email,
                phone: request.phone,
                notes: request.notes,
                purchase_amount: request.purchase_amount,
                transaction_id: request.transaction_id,
            },
        )
        .await?;
    Ok(Json(conversion))
}

pub fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/r/{code}", get(click_share_link))
        .route("/refer/{business_code}", get(business_landing))
        .route(
            "/refer/{business_code}/{referrer_code}",
            get(referrer_landing),
        )
        .route("/refer/submit", post(submit_referral))
}
