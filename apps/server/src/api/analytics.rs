use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use referra_core::analytics::BusinessAnalytics;
use referra_core::users::RoleKind;

use crate::auth::AuthActor;
use crate::error::ApiResult;
use crate::main_lib::AppState;

/// Dashboard projection for the acting business.
async fn get_analytics(
    AuthActor(actor): AuthActor,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BusinessAnalytics>> {
    actor.require_role(RoleKind::Business)?;
    let analytics = state.analytics_service.get_business_analytics(&actor.user_id)?;
    Ok(Json(analytics))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analytics", get(get_analytics))
}
