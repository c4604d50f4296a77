//! Database model for referrals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use referra_core::referrals::{NewReferral, Referral, ReferralStatus};

use crate::utils::parse_optional_decimal_column;

/// Database model for referrals
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
#[diesel(table_name = crate::schema::referrals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ReferralDB {
    pub id: String,
    pub campaign_id: String,
    pub business_id: String,
    pub referrer_id: String,
    pub referral_code: String,
    pub referral_link: String,
    pub custom_message: Option<String>,
    pub referee_name: Option<String>,
    pub referee_email: Option<String>,
    pub referee_phone: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub click_count: i32,
    pub clicked_at: Option<NaiveDateTime>,
    pub converted_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    pub customer_id: Option<String>,
    pub purchase_amount: Option<String>,
    pub transaction_id: Option<String>,
    pub rejected_reason: Option<String>,
    pub referrer_reward_id: Option<String>,
    pub customer_reward_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ReferralDB> for Referral {
    fn from(db: ReferralDB) -> Self {
        Self {
            status: ReferralStatus::parse(&db.status).unwrap_or_else(|_| {
                log::warn!(
                    "Referral {} has unknown status '{}', treating as REJECTED",
                    db.id,
                    db.status
                );
                ReferralStatus::Rejected
            }),
            purchase_amount: parse_optional_decimal_column(
                db.purchase_amount.as_deref(),
                "referrals.purchase_amount",
            ),
            id: db.id,
            campaign_id: db.campaign_id,
            business_id: db.business_id,
            referrer_id: db.referrer_id,
            referral_code: db.referral_code,
            referral_link: db.referral_link,
            custom_message: db.custom_message,
            referee_name: db.referee_name,
            referee_email: db.referee_email,
            referee_phone: db.referee_phone,
            notes: db.notes,
            click_count: db.click_count,
            created_at: db.created_at.and_utc(),
            clicked_at: db.clicked_at.map(|d| d.and_utc()),
            converted_at: db.converted_at.map(|d| d.and_utc()),
            expires_at: db.expires_at.map(|d| d.and_utc()),
            customer_id: db.customer_id,
            transaction_id: db.transaction_id,
            rejected_reason: db.rejected_reason,
            referrer_reward_id: db.referrer_reward_id,
            customer_reward_id: db.customer_reward_id,
            updated_at: db.updated_at.and_utc(),
        }
    }
}

impl ReferralDB {
    /// Row for a freshly generated referral; starts `PENDING` with zero clicks.
    pub fn from_new(domain: NewReferral, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            campaign_id: domain.campaign_id,
            business_id: domain.business_id,
            referrer_id: domain.referrer_id,
            referral_code: domain.referral_code,
            referral_link: domain.referral_link,
            custom_message: domain.custom_message,
            referee_name: None,
            referee_email: None,
            referee_phone: None,
            notes: None,
            status: ReferralStatus::Pending.as_str().to_string(),
            click_count: 0,
            clicked_at: None,
            converted_at: None,
            expires_at: domain.expires_at.map(|d| d.naive_utc()),
            customer_id: None,
            purchase_amount: None,
            transaction_id: None,
            rejected_reason: None,
            referrer_reward_id: None,
            customer_reward_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}
