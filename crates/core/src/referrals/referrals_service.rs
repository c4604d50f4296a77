use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::sync::Arc;

use super::codes::generate_code;
use super::referrals_errors::ReferralError;
use super::referrals_model::{
    Conversion, ConversionDetails, NewReferral, Referral, ReferralIdent, ReferralInvite,
};
use super::referrals_traits::{ReferralRepositoryTrait, ReferralServiceTrait};
use crate::campaigns::{Campaign, CampaignRepositoryTrait};
use crate::constants::{MAX_CODE_ATTEMPTS, REFERRAL_CODE_LEN};
use crate::errors::{DatabaseError, Result};
use crate::selections::SelectionRepositoryTrait;
use crate::users::{Actor, RoleKind, UserRepositoryTrait, UserRole};
use crate::Error;

/// Service for the referral ledger.
pub struct ReferralService {
    referral_repository: Arc<dyn ReferralRepositoryTrait>,
    campaign_repository: Arc<dyn CampaignRepositoryTrait>,
    selection_repository: Arc<dyn SelectionRepositoryTrait>,
    user_repository: Arc<dyn UserRepositoryTrait>,
    /// Public origin share links are built against, e.g. `https://ref.example.com`.
    base_url: String,
    referral_ttl_days: i64,
}

impl ReferralService {
    /// Creates a new ReferralService instance
    pub fn new(
        referral_repository: Arc<dyn ReferralRepositoryTrait>,
        campaign_repository: Arc<dyn CampaignRepositoryTrait>,
        selection_repository: Arc<dyn SelectionRepositoryTrait>,
        user_repository: Arc<dyn UserRepositoryTrait>,
        base_url: String,
        referral_ttl_days: i64,
    ) -> Self {
        Self {
            referral_repository,
            campaign_repository,
            selection_repository,
            user_repository,
            base_url: base_url.trim_end_matches('/').to_string(),
            referral_ttl_days,
        }
    }

    fn build_link(&self, code: &str) -> String {
        format!("{}/r/{}", self.base_url, code)
    }

    /// Verifies a referrer's access to a campaign, self-healing membership
    /// for same-company referrers.
    async fn ensure_campaign_access(&self, actor: &Actor, campaign: &Campaign) -> Result<()> {
        if self
            .selection_repository
            .find(&campaign.id, &actor.user_id)?
            .is_some()
        {
            return Ok(());
        }

        let user = self.user_repository.get_by_id(&actor.user_id)?;
        let same_company = matches!(
            &user.role,
            UserRole::Referrer { business_id: Some(b), .. } if *b == campaign.business_id
        );
        if !same_company {
            return Err(Error::Forbidden(format!(
                "referrer {} has no access to campaign {}",
                actor.user_id, campaign.id
            )));
        }

        let outcome = self
            .selection_repository
            .ensure_selected(&campaign.id, &actor.user_id)
            .await?;
        if outcome.newly_selected {
            debug!(
                "Implicitly selected campaign {} for referrer {}",
                campaign.id, actor.user_id
            );
        }
        Ok(())
    }

    /// Inserts a referral, retrying with a fresh code on a collision with
    /// the ledger's unique constraint.
    async fn create_with_code_retry(
        &self,
        campaign: &Campaign,
        referrer_id: &str,
        custom_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Referral> {
        let expires_at = Some(now + Duration::days(self.referral_ttl_days));
        for attempt in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(REFERRAL_CODE_LEN);
            let new_referral = NewReferral {
                campaign_id: campaign.id.clone(),
                business_id: campaign.business_id.clone(),
                referrer_id: referrer_id.to_string(),
                referral_link: self.build_link(&code),
                referral_code: code,
                custom_message: custom_message.clone(),
                expires_at,
            };
            match self.referral_repository.create(new_referral).await {
                Ok(referral) => return Ok(referral),
                Err(Error::Database(DatabaseError::UniqueViolation(detail))) => {
                    warn!(
                        "Referral code collision (attempt {}): {}",
                        attempt + 1,
                        detail
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::Referral(ReferralError::CodeSpaceExhausted(
            MAX_CODE_ATTEMPTS,
        )))
    }

    /// Loads a referral and fails with `Forbidden` unless the acting
    /// business owns it.
    fn get_owned(&self, actor: &Actor, referral_id: &str) -> Result<Referral> {
        actor.require_role(RoleKind::Business)?;
        let referral = self.referral_repository.get_by_id(referral_id)?;
        if referral.business_id != actor.user_id {
            return Err(Error::Forbidden(format!(
                "referral {} belongs to another business",
                referral_id
            )));
        }
        Ok(referral)
    }
}

#[async_trait::async_trait]
impl ReferralServiceTrait for ReferralService {
    async fn generate_link(
        &self,
        actor: &Actor,
        campaign_id: &str,
        custom_message: Option<String>,
    ) -> Result<ReferralInvite> {
        actor.require_role(RoleKind::Referrer)?;
        let campaign = self.campaign_repository.get_by_id(campaign_id)?;
        self.ensure_campaign_access(actor, &campaign).await?;

        let referral = self
            .create_with_code_retry(&campaign, &actor.user_id, custom_message, Utc::now())
            .await?;
        debug!(
            "Generated referral {} for campaign {} by {}",
            referral.referral_code, campaign_id, actor.user_id
        );
        Ok(ReferralInvite {
            referral_link: referral.referral_link,
            code: referral.referral_code,
        })
    }

    async fn track_click(&self, code: &str) -> Result<Referral> {
        self.referral_repository.record_click(code, Utc::now()).await
    }

    async fn open_referral_for(&self, campaign_id: &str, referrer_id: &str) -> Result<Referral> {
        if let Some(open) = self
            .referral_repository
            .find_open_for_referrer(campaign_id, referrer_id)?
        {
            return Ok(open);
        }

        let campaign = self.campaign_repository.get_by_id(campaign_id)?;
        // Landing via a shared company link also counts as selecting the
        // campaign; idempotent, so repeated landings are no-ops.
        self.selection_repository
            .ensure_selected(campaign_id, referrer_id)
            .await?;
        self.create_with_code_retry(&campaign, referrer_id, None, Utc::now())
            .await
    }

    async fn submit_conversion(
        &self,
        ident: ReferralIdent,
        details: ConversionDetails,
    ) -> Result<Conversion> {
        details.validate()?;
        let conversion = self
            .referral_repository
            .convert(ident, details, Utc::now())
            .await?;
        info!(
            "Referral {} converted; {} reward(s) issued",
            conversion.referral.id,
            conversion.rewards.len()
        );
        Ok(conversion)
    }

    async fn expire_referral(&self, actor: &Actor, referral_id: &str) -> Result<Referral> {
        self.get_owned(actor, referral_id)?;
        self.referral_repository.expire(referral_id, Utc::now()).await
    }

    async fn reject_referral(
        &self,
        actor: &Actor,
        referral_id: &str,
        reason: &str,
    ) -> Result<Referral> {
        self.get_owned(actor, referral_id)?;
        self.referral_repository
            .reject(referral_id, reason, Utc::now())
            .await
    }

    async fn expire_due_referrals(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.referral_repository.expire_due(now).await?;
        if expired > 0 {
            info!("Expired {} overdue referrals", expired);
        }
        Ok(expired)
    }

    fn get_referral(&self, actor: &Actor, referral_id: &str) -> Result<Referral> {
        let referral = self.referral_repository.get_by_id(referral_id)?;
        if referral.referrer_id != actor.user_id && referral.business_id != actor.user_id {
            return Err(Error::Forbidden(format!(
                "no access to referral {}",
                referral_id
            )));
        }
        Ok(referral)
    }

    fn get_referrals_for_referrer(&self, actor: &Actor) -> Result<Vec<Referral>> {
        self.referral_repository.list_by_referrer(&actor.user_id)
    }

    fn get_referrals_for_business(&self, actor: &Actor) -> Result<Vec<Referral>> {
        actor.require_role(RoleKind::Business)?;
        self.referral_repository.list_by_business(&actor.user_id)
    }
}
