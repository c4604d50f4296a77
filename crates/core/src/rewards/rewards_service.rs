use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::rewards_model::Reward;
use super::rewards_traits::{RewardRepositoryTrait, RewardServiceTrait};
use crate::errors::Result;
use crate::users::{Actor, RoleKind};
use crate::Error;

/// Service for the reward ledger.
pub struct RewardService {
    repository: Arc<dyn RewardRepositoryTrait>,
}

impl RewardService {
    /// Creates a new RewardService instance
    pub fn new(repository: Arc<dyn RewardRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Loads a reward and fails with `Forbidden` unless the acting business
    /// issued it.
    fn get_issued_by(&self, actor: &Actor, reward_id: &str) -> Result<Reward> {
        actor.require_role(RoleKind::Business)?;
        let reward = self.repository.get_by_id(reward_id)?;
        if reward.business_id != actor.user_id {
            return Err(Error::Forbidden(format!(
                "reward {} was issued by another business",
                reward_id
            )));
        }
        Ok(reward)
    }
}

#[async_trait::async_trait]
impl RewardServiceTrait for RewardService {
    async fn approve_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward> {
        self.get_issued_by(actor, reward_id)?;
        debug!("Approving reward {}", reward_id);
        self.repository.approve(reward_id, Utc::now()).await
    }

    async fn redeem_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward> {
        let reward = self.repository.get_by_id(reward_id)?;
        if reward.user_id != actor.user_id {
            return Err(Error::Forbidden(format!(
                "reward {} belongs to another recipient",
                reward_id
            )));
        }
        // The repository re-checks status inside its own transaction; the
        // read above is only for the ownership check.
        let redeemed = self.repository.redeem(reward_id, Utc::now()).await?;
        info!(
            "Reward {} redeemed by {} ({} {})",
            redeemed.id,
            actor.user_id,
            redeemed.amount,
            redeemed.kind.as_str()
        );
        Ok(redeemed)
    }

    async fn expire_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward> {
        self.get_issued_by(actor, reward_id)?;
        self.repository.expire(reward_id, Utc::now()).await
    }

    async fn expire_due_rewards(&self, now: DateTime<Utc>) -> Result<usize> {
        let expired = self.repository.expire_due(now).await?;
        if expired > 0 {
            info!("Expired {} overdue rewards", expired);
        }
        Ok(expired)
    }

    fn get_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward> {
        let reward = self.repository.get_by_id(reward_id)?;
        if reward.user_id != actor.user_id && reward.business_id != actor.user_id {
            return Err(Error::Forbidden(format!(
                "no access to reward {}",
                reward_id
            )));
        }
        Ok(reward)
    }

    fn get_rewards_for_recipient(&self, actor: &Actor) -> Result<Vec<Reward>> {
        self.repository.list_by_recipient(&actor.user_id)
    }

    fn get_rewards_for_business(&self, actor: &Actor) -> Result<Vec<Reward>> {
        actor.require_role(RoleKind::Business)?;
        self.repository.list_by_business(&actor.user_id)
    }
}
