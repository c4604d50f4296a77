//! Campaigns module - domain models, services, and traits.

mod campaigns_model;
mod campaigns_service;
mod campaigns_traits;

#[cfg(test)]
mod campaigns_model_tests;

// Re-export the public interface
pub use campaigns_model::{
    Campaign, CampaignCounters, CampaignUpdate, NewCampaign, RewardKind, RewardTerms,
};
pub use campaigns_service::CampaignService;
pub use campaigns_traits::{CampaignRepositoryTrait, CampaignServiceTrait};
