//! Background expiry sweep.
//!
//! Referral links and rewards carry validity windows; this task closes the
//! overdue ones on a fixed cadence so dashboards and redemption checks see
//! fresh terminal states without waiting for user traffic.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::main_lib::AppState;

pub fn start_expiry_scheduler(state: Arc<AppState>) {
    let period = Duration::from_secs(state.expiry_sweep_minutes * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately, which doubles as a catch-up
        // sweep after downtime.
        loop {
            interval.tick().await;
            let now = Utc::now();
            match state.referral_service.expire_due_referrals(now).await {
                Ok(count) if count > 0 => {
                    tracing::info!("expiry sweep closed {count} referrals")
                }
                Ok(_) => {}
                Err(e) => tracing::error!("referral expiry sweep failed: {e}"),
            }
            match state.reward_service.expire_due_rewards(now).await {
                Ok(count) if count > 0 => {
                    tracing::info!("expiry sweep closed {count} rewards")
                }
                Ok(_) => {}
                Err(e) => tracing::error!("reward expiry sweep failed: {e}"),
            }
        }
    });
}
