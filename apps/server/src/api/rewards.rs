use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use referra_core::rewards::Reward;

use crate::auth::AuthActor;
use crate::error::ApiResult;
use crate::main_lib::AppState;

async fn list_my_rewards(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Reward>>> {
    Ok(Json(state.reward_service.get_rewards_for_recipient(&actor)?))
}

async fn list_issued_rewards(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Reward>>> {
    Ok(Json(state.reward_service.get_rewards_for_business(&actor)?))
}

async fn get_reward(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Reward>> {
    Ok(Json(state.reward_service.get_reward(&actor, &id)?))
}

async fn approve_reward(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Reward>> {
    Ok(Json(state.reward_service.approve_reward(&actor, &id).await?))
}

/// Redemption is recipient-only; a concurrent duplicate redemption returns
/// 409 for the loser.
async fn redeem_reward(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Reward>> {
    Ok(Json(state.reward_service.redeem_reward(&actor, &id).await?))
}

async fn expire_reward(
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Reward>> {
    Ok(Json(state.reward_service.expire_reward(&actor, &id).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rewards", get(list_my_rewards))
        .route("/rewards/issued", get(list_issued_rewards))
        .route("/rewards/{id}", get(get_reward))
        .route("/rewards/{id}/approve", post(approve_reward))
        .route("/rewards/{id}/redeem", post(redeem_reward))
        .route("/rewards/{id}/expire", post(expire_reward))
}
