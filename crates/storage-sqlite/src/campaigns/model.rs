//! Database model for campaigns.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use referra_core::campaigns::{
    Campaign, CampaignCounters, NewCampaign, RewardKind, RewardTerms,
};

use crate::utils::parse_decimal_column;

/// Database model for campaigns
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::campaigns)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CampaignDB {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub is_active: bool,
    pub referrer_reward_kind: String,
    pub referrer_reward_amount: String,
    pub customer_reward_kind: String,
    pub customer_reward_amount: String,
    pub referral_count: i32,
    pub conversion_count: i32,
    pub referrer_count: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn terms_from_columns(kind: &str, amount: &str, field: &str) -> RewardTerms {
    RewardTerms {
        kind: RewardKind::parse(kind).unwrap_or_else(|_| {
            log::warn!("Unknown reward kind '{}' in {}, defaulting to CASH", kind, field);
            RewardKind::Cash
        }),
        amount: parse_decimal_column(amount, field),
    }
}

impl From<CampaignDB> for Campaign {
    fn from(db: CampaignDB) -> Self {
        Self {
            referrer_reward: terms_from_columns(
                &db.referrer_reward_kind,
                &db.referrer_reward_amount,
                "referrer_reward",
            ),
            customer_reward: terms_from_columns(
                &db.customer_reward_kind,
                &db.customer_reward_amount,
                "customer_reward",
            ),
            id: db.id,
            business_id: db.business_id,
            name: db.name,
            description: db.description,
            start_date: db.start_date.and_utc(),
            end_date: db.end_date.map(|d| d.and_utc()),
            is_active: db.is_active,
            counters: CampaignCounters {
                referral_count: db.referral_count,
                conversion_count: db.conversion_count,
                referrer_count: db.referrer_count,
            },
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        }
    }
}

impl CampaignDB {
    /// Builds the row for a freshly created campaign; counters start at zero.
    pub fn from_new(business_id: &str, domain: NewCampaign, now: NaiveDateTime) -> Self {
        Self {
            id: domain
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            business_id: business_id.to_string(),
            name: domain.name,
            description: domain.description,
            start_date: domain.start_date.naive_utc(),
            end_date: domain.end_date.map(|d| d.naive_utc()),
            is_active: domain.is_active,
            referrer_reward_kind: domain.referrer_reward.kind.as_str().to_string(),
            referrer_reward_amount: domain.referrer_reward.amount.to_string(),
            customer_reward_kind: domain.customer_reward.kind.as_str().to_string(),
            customer_reward_amount: domain.customer_reward.amount.to_string(),
            referral_count: 0,
            conversion_count: 0,
            referrer_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
