use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use referra_core::campaigns::{
    Campaign, CampaignCounters, CampaignRepositoryTrait, CampaignUpdate, NewCampaign,
};
use referra_core::referrals::ReferralStatus;
use referra_core::Result;

use super::model::CampaignDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{campaign_selections, campaigns, referrals};

/// Repository for managing campaign data in the database
pub struct CampaignRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CampaignRepository {
    /// Creates a new CampaignRepository instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CampaignRepositoryTrait for CampaignRepository {
    async fn create(&self, business_id: &str, new_campaign: NewCampaign) -> Result<Campaign> {
        let business_id_owned = business_id.to_string();
        self.writer
            .exec(move |conn| {
                let campaign_db = CampaignDB::from_new(
                    &business_id_owned,
                    new_campaign,
                    chrono::Utc::now().naive_utc(),
                );
                diesel::insert_into(campaigns::table)
                    .values(&campaign_db)
                    .execute(conn)
                    .into_core()?;
                Ok(Campaign::from(campaign_db))
            })
            .await
    }

    async fn update(&self, campaign_update: CampaignUpdate) -> Result<Campaign> {
        self.writer
            .exec(move |conn| {
                let now = chrono::Utc::now().naive_utc();
                diesel::update(campaigns::table.find(&campaign_update.id))
                    .set((
                        campaigns::name.eq(&campaign_update.name),
                        campaigns::description.eq(campaign_update.description.clone()),
                        campaigns::end_date.eq(campaign_update.end_date.map(|d| d.naive_utc())),
                        campaigns::is_active.eq(campaign_update.is_active),
                        campaigns::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .into_core()?;

                let result_db = campaigns::table
                    .select(CampaignDB::as_select())
                    .find(&campaign_update.id)
                    .first::<CampaignDB>(conn)
                    .into_core()?;
                Ok(Campaign::from(result_db))
            })
            .await
    }

    fn get_by_id(&self, campaign_id: &str) -> Result<Campaign> {
        let mut conn = get_connection(&self.pool)?;
        let campaign = campaigns::table
            .select(CampaignDB::as_select())
            .find(campaign_id)
            .first::<CampaignDB>(&mut conn)
            .into_core()?;
        Ok(campaign.into())
    }

    fn list_by_business(&self, business_id: &str, active_only: bool) -> Result<Vec<Campaign>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = campaigns::table
            .filter(campaigns::business_id.eq(business_id))
            .into_boxed();
        if active_only {
            query = query.filter(campaigns::is_active.eq(true));
        }

        let results = query
            .select(CampaignDB::as_select())
            .order(campaigns::created_at.desc())
            .load::<CampaignDB>(&mut conn)
            .into_core()?;
        Ok(results.into_iter().map(Campaign::from).collect())
    }

    fn find_default_for_business(&self, business_id: &str) -> Result<Option<Campaign>> {
        let mut conn = get_connection(&self.pool)?;
        let campaign = campaigns::table
            .select(CampaignDB::as_select())
            .filter(campaigns::business_id.eq(business_id))
            .filter(campaigns::is_active.eq(true))
            .order(campaigns::created_at.desc())
            .first::<CampaignDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(campaign.map(Campaign::from))
    }

    /// Recomputes the denormalized counters from their sources of truth.
    /// The counters are a display cache; this is the reconciliation routine
    /// the campaign service exposes to businesses.
    async fn recount(&self, campaign_id: &str) -> Result<CampaignCounters> {
        let campaign_id_owned = campaign_id.to_string();
        self.writer
            .exec(move |conn| {
                let total: i64 = referrals::table
                    .filter(referrals::campaign_id.eq(&campaign_id_owned))
                    .count()
                    .get_result(conn)
                    .into_core()?;
                let converted: i64 = referrals::table
                    .filter(referrals::campaign_id.eq(&campaign_id_owned))
                    .filter(referrals::status.eq(ReferralStatus::Converted.as_str()))
                    .count()
                    .get_result(conn)
                    .into_core()?;
                let referrers: i64 = campaign_selections::table
                    .filter(campaign_selections::campaign_id.eq(&campaign_id_owned))
                    .count()
                    .get_result(conn)
                    .into_core()?;

                let counters = CampaignCounters {
                    referral_count: total as i32,
                    conversion_count: converted as i32,
                    referrer_count: referrers as i32,
                };
                diesel::update(campaigns::table.find(&campaign_id_owned))
                    .set((
                        campaigns::referral_count.eq(counters.referral_count),
                        campaigns::conversion_count.eq(counters.conversion_count),
                        campaigns::referrer_count.eq(counters.referrer_count),
                        campaigns::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .into_core()?;

                Ok(counters)
            })
            .await
    }
}
