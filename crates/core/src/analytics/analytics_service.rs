use log::debug;
use std::collections::HashMap;
use std::sync::Arc;

use super::analytics_model::{
    conversion_rate, ActivityEntry, AnalyticsSummary, BusinessAnalytics, CampaignPerformance,
    TopReferrer,
};
use crate::campaigns::CampaignRepositoryTrait;
use crate::constants::{RECENT_ACTIVITY_LIMIT, TOP_REFERRERS_LIMIT};
use crate::errors::Result;
use crate::referrals::{Referral, ReferralRepositoryTrait, ReferralStatus};
use crate::users::UserRepositoryTrait;

/// Trait defining the contract for the aggregation engine.
pub trait AnalyticsServiceTrait: Send + Sync {
    /// Computes the full dashboard projection for a business.
    ///
    /// Read-only; runs against a possibly slightly stale snapshot and never
    /// participates in the ledgers' write discipline.
    fn get_business_analytics(&self, business_id: &str) -> Result<BusinessAnalytics>;
}

/// Aggregation engine over the referral ledger, campaign registry, and
/// user directory.
pub struct AnalyticsService {
    referral_repository: Arc<dyn ReferralRepositoryTrait>,
    campaign_repository: Arc<dyn CampaignRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
}

impl AnalyticsService {
    /// Creates a new AnalyticsService instance
    pub fn new(
        referral_repository: Arc<dyn ReferralRepositoryTrait>,
        campaign_repository: Arc<dyn CampaignRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
    ) -> Self {
        Self {
            referral_repository,
            campaign_repository,
            user_repository,
        }
    }

    fn top_referrers(&self, referrals: &[Referral]) -> Result<Vec<TopReferrer>> {
        // (total, converted) per referrer
        let mut per_referrer: HashMap<&str, (usize, usize)> = HashMap::new();
        for referral in referrals {
            let entry = per_referrer.entry(referral.referrer_id.as_str()).or_default();
            entry.0 += 1;
            if referral.status == ReferralStatus::Converted {
                entry.1 += 1;
            }
        }

        let mut ranked: Vec<(&str, (usize, usize))> = per_referrer.into_iter().collect();
        // Converted count descending; ties broken by referrer id so the
        // ranking is reproducible for identical inputs.
        ranked.sort_by(|a, b| b.1 .1.cmp(&a.1 .1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(TOP_REFERRERS_LIMIT);

        let ids: Vec<String> = ranked.iter().map(|(id, _)| id.to_string()).collect();
        let users = self.user_repository.list_by_ids(&ids)?;
        let names: HashMap<&str, (&str, &str)> = users
            .iter()
            .map(|u| (u.id.as_str(), (u.name.as_str(), u.email.as_str())))
            .collect();

        Ok(ranked
            .into_iter()
            .map(|(id, (total, converted))| {
                let (name, email) = names.get(id).copied().unwrap_or((id, ""));
                TopReferrer {
                    referrer_id: id.to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    total_referrals: total,
                    converted_referrals: converted,
                    conversion_rate: conversion_rate(converted, total),
                }
            })
            .collect())
    }
}

impl AnalyticsServiceTrait for AnalyticsService {
    fn get_business_analytics(&self, business_id: &str) -> Result<BusinessAnalytics> {
        debug!("Computing analytics for business {}", business_id);

        let referrals = self.referral_repository.list_by_business(business_id)?;
        let campaigns = self.campaign_repository.list_by_business(business_id, false)?;

        // --- Summary ---
        let total_referrals = referrals.len();
        let total_clicks: i64 = referrals.iter().map(|r| r.click_count as i64).sum();
        let total_conversions = referrals
            .iter()
            .filter(|r| r.status == ReferralStatus::Converted)
            .count();
        let summary = AnalyticsSummary {
            total_referrals,
            total_clicks,
            total_conversions,
            conversion_rate: conversion_rate(total_conversions, total_referrals),
            active_referrals: referrals
                .iter()
                .filter(|r| r.status == ReferralStatus::Pending)
                .count(),
            active_campaigns: campaigns.iter().filter(|c| c.is_active).count(),
            customers: self.user_repository.count_customers(business_id)?,
        };

        // --- Campaign performance (zero-referral campaigns included) ---
        let mut per_campaign: HashMap<&str, (usize, usize)> = HashMap::new();
        for referral in &referrals {
            let entry = per_campaign.entry(referral.campaign_id.as_str()).or_default();
            entry.0 += 1;
            if referral.status == ReferralStatus::Converted {
                entry.1 += 1;
            }
        }
        let campaign_performance = campaigns
            .iter()
            .map(|campaign| {
                let (total, converted) = per_campaign
                    .get(campaign.id.as_str())
                    .copied()
                    .unwrap_or((0, 0));
                CampaignPerformance {
                    campaign_id: campaign.id.clone(),
                    campaign_name: campaign.name.clone(),
                    is_active: campaign.is_active,
                    total_referrals: total,
                    converted_referrals: converted,
                    conversion_rate: conversion_rate(converted, total),
                }
            })
            .collect();

        // --- Recent activity ---
        let campaign_names: HashMap<&str, &str> = campaigns
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();
        let mut by_recency: Vec<&Referral> = referrals.iter().collect();
        by_recency.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_activity = by_recency
            .into_iter()
            .take(RECENT_ACTIVITY_LIMIT)
            .map(|referral| ActivityEntry {
                referral_id: referral.id.clone(),
                referrer_id: referral.referrer_id.clone(),
                customer_id: referral.customer_id.clone(),
                status: referral.status,
                campaign_id: referral.campaign_id.clone(),
                campaign_name: campaign_names
                    .get(referral.campaign_id.as_str())
                    .copied()
                    .unwrap_or_default()
                    .to_string(),
                occurred_at: referral.created_at,
            })
            .collect();

        let top_referrers = self.top_referrers(&referrals)?;

        Ok(BusinessAnalytics {
            summary,
            recent_activity,
            campaign_performance,
            top_referrers,
        })
    }
}
