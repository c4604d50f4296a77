use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use referra_core::campaigns::{Campaign, CampaignCounters, CampaignUpdate, NewCampaign};

use crate::auth::AuthActor;
use crate::error::ApiResult;
use crate::main_lib::AppState;

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    active_only: bool,
}

async fn list_campaigns(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<Campaign>>> {
    let campaigns = state
        .campaign_service
        .list_campaigns(&actor, params.active_only)?;
    Ok(Json(campaigns))
}

async fn create_campaign(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
    Json(new_campaign): Json<NewCampaign>,
) -> ApiResult<Json<Campaign>> {
    let campaign = state
        .campaign_service
        .create_campaign(&actor, new_campaign)
        .await?;
    Ok(Json(campaign))
}

async fn update_campaign(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
    Json(update): Json<CampaignUpdate>,
) -> ApiResult<Json<Campaign>> {
    let campaign = state.campaign_service.update_campaign(&actor, update).await?;
    Ok(Json(campaign))
}

async fn get_campaign(
    AuthActor(_actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Campaign>> {
    Ok(Json(state.campaign_service.get_campaign(&id)?))
}

/// Recomputes the cached counters from the referral ledger.
async fn reconcile_campaign(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CampaignCounters>> {
    let counters = state
        .campaign_service
        .reconcile_counters(&actor, &id)
        .await?;
    Ok(Json(counters))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/campaigns",
            get(list_campaigns).post(create_campaign).put(update_campaign),
        )
        .route("/campaigns/{id}", get(get_campaign))
        .route("/campaigns/{id}/reconcile", post(reconcile_campaign))
}
