mod api;
mod auth;
mod config;
mod error;
mod main_lib;
mod scheduler;

use api::app_router;
use config::Config;
use main_lib::{build_state, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    // Background sweep for overdue referrals and rewards
    scheduler::start_expiry_scheduler(state.clone());

    let router = app_router(state);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
