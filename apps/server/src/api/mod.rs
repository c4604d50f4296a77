//! HTTP routers, one module per domain.

mod analytics;
mod campaigns;
mod referrals;
mod rewards;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public share-link surface
        .merge(referrals::public_router())
        // Authenticated API
        .nest(
            "/api",
            Router::new()
                .merge(campaigns::router())
                .merge(referrals::router())
                .merge(rewards::router())
                .merge(analytics::router()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
