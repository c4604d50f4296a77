//! Rewards module - domain models, services, and traits.

mod rewards_errors;
mod rewards_model;
mod rewards_service;
mod rewards_traits;

#[cfg(test)]
mod rewards_service_tests;

// Re-export the public interface
pub use rewards_errors::RewardError;
pub use rewards_model::{NewReward, Reward, RewardStatus};
pub use rewards_service::RewardService;
pub use rewards_traits::{RewardRepositoryTrait, RewardServiceTrait};
