//! Database model for campaign selections.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use referra_core::selections::{CampaignSelection, SelectionStatus};

/// Database model for the referrer ↔ campaign selection relation
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
#[diesel(table_name = crate::schema::campaign_selections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CampaignSelectionDB {
    pub id: String,
    pub campaign_id: String,
    pub referrer_id: String,
    pub status: String,
    pub selected_at: NaiveDateTime,
}

impl From<CampaignSelectionDB> for CampaignSelection {
    fn from(db: CampaignSelectionDB) -> Self {
        let status = match db.status.as_str() {
            "INACTIVE" => SelectionStatus::Inactive,
            _ => SelectionStatus::Active,
        };
        Self {
            id: db.id,
            campaign_id: db.campaign_id,
            referrer_id: db.referrer_id,
            status,
            selected_at: db.selected_at.and_utc(),
        }
    }
}

impl CampaignSelectionDB {
    pub fn new(campaign_id: &str, referrer_id: &str, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            campaign_id: campaign_id.to_string(),
            referrer_id: referrer_id.to_string(),
            status: SelectionStatus::Active.as_str().to_string(),
            selected_at: now,
        }
    }
}
