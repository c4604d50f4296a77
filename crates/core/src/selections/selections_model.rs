//! Campaign selection domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a selection is currently in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    #[default]
    Active,
    Inactive,
}

impl SelectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStatus::Active => "ACTIVE",
            SelectionStatus::Inactive => "INACTIVE",
        }
    }
}

/// A referrer's membership in a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignSelection {
    pub id: String,
    pub campaign_id: String,
    pub referrer_id: String,
    pub status: SelectionStatus,
    pub selected_at: DateTime<Utc>,
}

/// Result of an idempotent `ensure_selected` call.
///
/// `newly_selected` is true only for the call that actually inserted the
/// row; the campaign's `referrer_count` is bumped on that call alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionOutcome {
    pub selection: CampaignSelection,
    pub newly_selected: bool,
}
