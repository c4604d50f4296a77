//! Reward repository and service traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::rewards_model::Reward;
use crate::errors::Result;
use crate::users::Actor;

/// Trait defining the contract for Reward repository operations.
///
/// Every status write is a compare-and-set against the expected current
/// status; blind overwrites are not part of this contract. Rewards are
/// inserted by the referral ledger's conversion transaction, not through
/// this trait.
#[async_trait]
pub trait RewardRepositoryTrait: Send + Sync {
    /// Retrieves a reward by its ID.
    fn get_by_id(&self, reward_id: &str) -> Result<Reward>;

    /// Lists rewards earned by a recipient.
    fn list_by_recipient(&self, user_id: &str) -> Result<Vec<Reward>>;

    /// Lists rewards issued under a business's campaigns.
    fn list_by_business(&self, business_id: &str) -> Result<Vec<Reward>>;

    /// CAS `pending → available`. Fails with `InvalidState` from any other
    /// status, `NotFound` if the reward does not exist.
    async fn approve(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward>;

    /// CAS `available → redeemed`, stamping `date_redeemed`.
    ///
    /// Exactly one of two concurrent calls succeeds; the loser gets
    /// `Conflict`. Any status other than `available`/`redeemed` fails with
    /// `InvalidState`.
    async fn redeem(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward>;

    /// CAS `pending|available → expired`.
    async fn expire(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward>;

    /// Bulk-expires every pending/available reward whose validity window has
    /// passed. Returns the number of rows transitioned.
    async fn expire_due(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Trait defining the contract for Reward service operations.
#[async_trait]
pub trait RewardServiceTrait: Send + Sync {
    /// Approves a pending reward; business actor owning the campaign only.
    async fn approve_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward>;

    /// Redeems an available reward; recipient only. Exactly one concurrent
    /// redemption wins, the other observes `Conflict`.
    async fn redeem_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward>;

    /// Expires a specific reward; business actor owning the campaign only.
    async fn expire_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward>;

    /// Sweeps all overdue rewards. Called by the scheduler.
    async fn expire_due_rewards(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Retrieves a reward the actor may see (recipient or owning business).
    fn get_reward(&self, actor: &Actor, reward_id: &str) -> Result<Reward>;

    /// Lists the actor's own rewards.
    fn get_rewards_for_recipient(&self, actor: &Actor) -> Result<Vec<Reward>>;

    /// Lists rewards issued by the acting business.
    fn get_rewards_for_business(&self, actor: &Actor) -> Result<Vec<Reward>>;
}
