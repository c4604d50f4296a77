//! Reward ledger error types.

use thiserror::Error;

use super::rewards_model::RewardStatus;

/// Errors specific to reward lifecycle operations.
#[derive(Error, Debug)]
pub enum RewardError {
    #[error("reward cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: RewardStatus, to: RewardStatus },
}
