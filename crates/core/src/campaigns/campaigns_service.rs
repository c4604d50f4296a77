use log::debug;
use std::sync::Arc;

use super::campaigns_model::{Campaign, CampaignCounters, CampaignUpdate, NewCampaign};
use super::campaigns_traits::{CampaignRepositoryTrait, CampaignServiceTrait};
use crate::errors::Result;
use crate::users::{Actor, RoleKind};
use crate::Error;

/// Service for managing campaigns.
pub struct CampaignService {
    repository: Arc<dyn CampaignRepositoryTrait>,
}

impl CampaignService {
    /// Creates a new CampaignService instance
    pub fn new(repository: Arc<dyn CampaignRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Loads a campaign and fails with `Forbidden` unless it belongs to the
    /// acting business.
    fn get_owned(&self, actor: &Actor, campaign_id: &str) -> Result<Campaign> {
        actor.require_role(RoleKind::Business)?;
        let campaign = self.repository.get_by_id(campaign_id)?;
        if campaign.business_id != actor.user_id {
            return Err(Error::Forbidden(format!(
                "campaign {} belongs to another business",
                campaign_id
            )));
        }
        Ok(campaign)
    }
}

#[async_trait::async_trait]
impl CampaignServiceTrait for CampaignService {
    async fn create_campaign(&self, actor: &Actor, new_campaign: NewCampaign) -> Result<Campaign> {
        actor.require_role(RoleKind::Business)?;
        new_campaign.validate()?;
        debug!(
            "Creating campaign '{}' for business {}",
            new_campaign.name, actor.user_id
        );
        self.repository.create(&actor.user_id, new_campaign).await
    }

    async fn update_campaign(
        &self,
        actor: &Actor,
        campaign_update: CampaignUpdate,
    ) -> Result<Campaign> {
        campaign_update.validate()?;
        self.get_owned(actor, &campaign_update.id)?;
        self.repository.update(campaign_update).await
    }

    fn get_campaign(&self, campaign_id: &str) -> Result<Campaign> {
        self.repository.get_by_id(campaign_id)
    }

    fn get_default_campaign(&self, business_id: &str) -> Result<Option<Campaign>> {
        self.repository.find_default_for_business(business_id)
    }

    fn list_campaigns(&self, actor: &Actor, active_only: bool) -> Result<Vec<Campaign>> {
        actor.require_role(RoleKind::Business)?;
        self.repository.list_by_business(&actor.user_id, active_only)
    }

    async fn reconcile_counters(
        &self,
        actor: &Actor,
        campaign_id: &str,
    ) -> Result<CampaignCounters> {
        self.get_owned(actor, campaign_id)?;
        let counters = self.repository.recount(campaign_id).await?;
        debug!(
            "Reconciled counters for campaign {}: {} referrals, {} conversions, {} referrers",
            campaign_id,
            counters.referral_count,
            counters.conversion_count,
            counters.referrer_count
        );
        Ok(counters)
    }
}
