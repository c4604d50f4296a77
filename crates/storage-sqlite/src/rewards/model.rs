//! Database model for rewards.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use referra_core::campaigns::RewardKind;
use referra_core::rewards::{NewReward, Reward, RewardStatus};

use crate::utils::parse_decimal_column;

/// Database model for rewards
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
#[diesel(table_name = crate::schema::rewards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RewardDB {
    pub id: String,
    pub user_id: String,
    pub campaign_id: String,
    pub business_id: String,
    pub kind: String,
    pub amount: String,
    pub status: String,
    pub description: String,
    pub code: String,
    pub date_earned: NaiveDateTime,
    pub date_redeemed: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<RewardDB> for Reward {
    fn from(db: RewardDB) -> Self {
        Self {
            kind: RewardKind::parse(&db.kind).unwrap_or_else(|_| {
                log::warn!("Reward {} has unknown kind '{}', defaulting to CASH", db.id, db.kind);
                RewardKind::Cash
            }),
            amount: parse_decimal_column(&db.amount, "rewards.amount"),
            status: RewardStatus::parse(&db.status).unwrap_or_else(|_| {
                log::warn!(
                    "Reward {} has unknown status '{}', treating as EXPIRED",
                    db.id,
                    db.status
                );
                RewardStatus::Expired
            }),
            id: db.id,
            user_id: db.user_id,
            campaign_id: db.campaign_id,
            business_id: db.business_id,
            description: db.description,
            code: db.code,
            date_earned: db.date_earned.and_utc(),
            date_redeemed: db.date_redeemed.map(|d| d.and_utc()),
            expires_at: db.expires_at.map(|d| d.and_utc()),
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        }
    }
}

impl RewardDB {
    /// Row for a reward issued at conversion time; starts `PENDING`.
    pub fn from_new(new_reward: NewReward, code: String, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_reward.user_id,
            campaign_id: new_reward.campaign_id,
            business_id: new_reward.business_id,
            kind: new_reward.kind.as_str().to_string(),
            amount: new_reward.amount.to_string(),
            status: RewardStatus::Pending.as_str().to_string(),
            description: new_reward.description,
            code,
            date_earned: now,
            date_redeemed: None,
            expires_at: new_reward.expires_at.map(|d| d.naive_utc()),
            created_at: now,
            updated_at: now,
        }
    }
}
