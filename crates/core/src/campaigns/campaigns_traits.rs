//! Campaign repository and service traits.
//!
//! These traits define the contract for campaign operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::campaigns_model::{Campaign, CampaignCounters, CampaignUpdate, NewCampaign};
use crate::errors::Result;
use crate::users::Actor;

/// Trait defining the contract for Campaign repository operations.
///
/// The denormalized counters are not mutated through this trait: increments
/// ride inside the referral ledger's transactional operations so those
/// atomic units hold, and `recount` re-derives them from the ledger.
#[async_trait]
pub trait CampaignRepositoryTrait: Send + Sync {
    /// Creates a new campaign owned by `business_id`.
    async fn create(&self, business_id: &str, new_campaign: NewCampaign) -> Result<Campaign>;

    /// Updates an existing campaign.
    async fn update(&self, campaign_update: CampaignUpdate) -> Result<Campaign>;

    /// Retrieves a campaign by its ID.
    fn get_by_id(&self, campaign_id: &str) -> Result<Campaign>;

    /// Lists campaigns for a business, optionally only active ones.
    fn list_by_business(&self, business_id: &str, active_only: bool) -> Result<Vec<Campaign>>;

    /// The business's default campaign for code-only share links: the most
    /// recently created active campaign.
    fn find_default_for_business(&self, business_id: &str) -> Result<Option<Campaign>>;

    /// Recomputes the denormalized counters from the referral ledger and
    /// campaign selections, persists them, and returns the fresh values.
    async fn recount(&self, campaign_id: &str) -> Result<CampaignCounters>;
}

/// Trait defining the contract for Campaign service operations.
#[async_trait]
pub trait CampaignServiceTrait: Send + Sync {
    /// Creates a campaign for the acting business.
    async fn create_campaign(&self, actor: &Actor, new_campaign: NewCampaign) -> Result<Campaign>;

    /// Updates a campaign owned by the acting business.
    async fn update_campaign(
        &self,
        actor: &Actor,
        campaign_update: CampaignUpdate,
    ) -> Result<Campaign>;

    /// Retrieves a campaign by ID.
    fn get_campaign(&self, campaign_id: &str) -> Result<Campaign>;

    /// The campaign a bare `/refer/{businessCode}` landing resolves to.
    fn get_default_campaign(&self, business_id: &str) -> Result<Option<Campaign>>;

    /// Lists the acting business's campaigns.
    fn list_campaigns(&self, actor: &Actor, active_only: bool) -> Result<Vec<Campaign>>;

    /// Reconciles the cached counters of a campaign owned by the acting
    /// business against the referral ledger.
    async fn reconcile_counters(&self, actor: &Actor, campaign_id: &str)
        -> Result<CampaignCounters>;
}
