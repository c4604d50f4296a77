//! Application state wiring.
//!
//! Every component gets an explicitly constructed, injected store handle;
//! there is no ambient global connection.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use referra_core::analytics::{AnalyticsService, AnalyticsServiceTrait};
use referra_core::campaigns::{CampaignService, CampaignServiceTrait};
use referra_core::referrals::{ReferralService, ReferralServiceTrait};
use referra_core::rewards::{RewardService, RewardServiceTrait};
use referra_core::users::UserRepositoryTrait;
use referra_storage_sqlite::campaigns::CampaignRepository;
use referra_storage_sqlite::db;
use referra_storage_sqlite::referrals::ReferralRepository;
use referra_storage_sqlite::rewards::RewardRepository;
use referra_storage_sqlite::selections::SelectionRepository;
use referra_storage_sqlite::users::UserRepository;

use crate::auth::decoding_key;
use crate::config::Config;

pub struct AppState {
    pub campaign_service: Arc<dyn CampaignServiceTrait>,
    pub referral_service: Arc<dyn ReferralServiceTrait>,
    pub reward_service: Arc<dyn RewardServiceTrait>,
    pub analytics_service: Arc<dyn AnalyticsServiceTrait>,
    pub user_repository: Arc<dyn UserRepositoryTrait>,
    pub jwt_decoding_key: DecodingKey,
    pub expiry_sweep_minutes: u64,
}

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.app_data_dir)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let referral_repository = Arc::new(ReferralRepository::new(
        pool.clone(),
        writer.clone(),
        config.reward_ttl_days,
    ));
    let reward_repository = Arc::new(RewardRepository::new(pool.clone(), writer.clone()));
    let campaign_repository = Arc::new(CampaignRepository::new(pool.clone(), writer.clone()));
    let selection_repository = Arc::new(SelectionRepository::new(pool.clone(), writer.clone()));
    let user_repository = Arc::new(UserRepository::new(pool.clone()));

    let referral_service = Arc::new(ReferralService::new(
        referral_repository.clone(),
        campaign_repository.clone(),
        selection_repository,
        user_repository.clone(),
        config.base_url.clone(),
        config.referral_ttl_days,
    ));
    let reward_service = Arc::new(RewardService::new(reward_repository));
    let campaign_service = Arc::new(CampaignService::new(campaign_repository.clone()));
    let analytics_service = Arc::new(AnalyticsService::new(
        referral_repository,
        campaign_repository,
        user_repository.clone(),
    ));

    Ok(Arc::new(AppState {
        campaign_service,
        referral_service,
        reward_service,
        analytics_service,
        user_repository,
        jwt_decoding_key: decoding_key(&config.jwt_secret),
        expiry_sweep_minutes: config.expiry_sweep_minutes,
    }))
}
