//! Reward domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::campaigns::RewardKind;
use crate::{errors::ValidationError, Error, Result};

/// Reward lifecycle status.
///
/// `Pending` awaits business approval; `Available` is redeemable;
/// `Redeemed` and `Expired` are terminal. A redeemed reward is never
/// expired retroactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardStatus {
    #[default]
    Pending,
    Available,
    Redeemed,
    Expired,
}

impl RewardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardStatus::Pending => "PENDING",
            RewardStatus::Available => "AVAILABLE",
            RewardStatus::Redeemed => "REDEEMED",
            RewardStatus::Expired => "EXPIRED",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "PENDING" => Ok(RewardStatus::Pending),
            "AVAILABLE" => Ok(RewardStatus::Available),
            "REDEEMED" => Ok(RewardStatus::Redeemed),
            "EXPIRED" => Ok(RewardStatus::Expired),
            other => Err(Error::Validation(ValidationError::field(
                "status",
                format!("unknown reward status '{}'", other),
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RewardStatus::Redeemed | RewardStatus::Expired)
    }

    /// The directed transition graph: pending → available → redeemed, with
    /// expired reachable from pending or available.
    pub fn can_transition_to(&self, next: RewardStatus) -> bool {
        matches!(
            (self, next),
            (RewardStatus::Pending, RewardStatus::Available)
                | (RewardStatus::Pending, RewardStatus::Expired)
                | (RewardStatus::Available, RewardStatus::Redeemed)
                | (RewardStatus::Available, RewardStatus::Expired)
        )
    }
}

/// Domain model representing an issued reward.
///
/// Created by the referral ledger when a referral converts; mutated only by
/// approval, redemption, and expiry. Never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    /// Recipient (referrer or converted customer).
    pub user_id: String,
    pub campaign_id: String,
    pub business_id: String,
    pub kind: RewardKind,
    pub amount: Decimal,
    pub status: RewardStatus,
    pub description: String,
    /// Unique redemption code.
    pub code: String,
    pub date_earned: DateTime<Utc>,
    /// Set exactly when status is `Redeemed`.
    pub date_redeemed: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for a reward issued at conversion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReward {
    pub user_id: String,
    pub campaign_id: String,
    pub business_id: String,
    pub kind: RewardKind,
    pub amount: Decimal,
    pub description: String,
    pub expires_at: Option<DateTime<Utc>>,
}
