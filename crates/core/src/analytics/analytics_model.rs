//! Analytics projection models.
//!
//! Everything here is derived on demand from the referral ledger, the
//! campaign registry, and the user directory; nothing is a source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::referrals::ReferralStatus;

/// Integer conversion rate in percent: `round(converted / total * 100)`.
///
/// Returns 0 when `total` is 0 so empty businesses produce clean zeros
/// instead of a division error.
pub fn conversion_rate(converted: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((converted as f64 / total as f64) * 100.0).round() as u32
}

/// Dashboard headline numbers for one business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_referrals: usize,
    /// Sum of per-referral click counters; independent of status.
    pub total_clicks: i64,
    pub total_conversions: usize,
    pub conversion_rate: u32,
    /// Referrals still in `pending`.
    pub active_referrals: usize,
    pub active_campaigns: usize,
    pub customers: i64,
}

/// One row of the top-referrers ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopReferrer {
    pub referrer_id: String,
    pub name: String,
    pub email: String,
    pub total_referrals: usize,
    pub converted_referrals: usize,
    pub conversion_rate: u32,
}

/// Per-campaign performance; campaigns with zero referrals still appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformance {
    pub campaign_id: String,
    pub campaign_name: String,
    pub is_active: bool,
    pub total_referrals: usize,
    pub converted_referrals: usize,
    pub conversion_rate: u32,
}

/// One entry of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub referral_id: String,
    pub referrer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    pub status: ReferralStatus,
    pub campaign_id: String,
    pub campaign_name: String,
    pub occurred_at: DateTime<Utc>,
}

/// The full dashboard payload for a business.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessAnalytics {
    pub summary: AnalyticsSummary,
    pub recent_activity: Vec<ActivityEntry>,
    pub campaign_performance: Vec<CampaignPerformance>,
    pub top_referrers: Vec<TopReferrer>,
}
