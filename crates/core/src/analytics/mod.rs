//! Analytics module - read-only aggregation over the ledgers.

mod analytics_model;
mod analytics_service;


// Re-export the public interface
pub use analytics_model::{
    conversion_rate, ActivityEntry, AnalyticsSummary, BusinessAnalytics, CampaignPerformance,
    TopReferrer,
};
pub use analytics_service::{AnalyticsService, AnalyticsServiceTrait};
