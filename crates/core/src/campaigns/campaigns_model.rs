//! Campaign domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// What a reward is paid out as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardKind {
    #[default]
    Cash,
    Discount,
    Gift,
    Points,
}

impl RewardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardKind::Cash => "CASH",
            RewardKind::Discount => "DISCOUNT",
            RewardKind::Gift => "GIFT",
            RewardKind::Points => "POINTS",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "CASH" => Ok(RewardKind::Cash),
            "DISCOUNT" => Ok(RewardKind::Discount),
            "GIFT" => Ok(RewardKind::Gift),
            "POINTS" => Ok(RewardKind::Points),
            other => Err(Error::Validation(ValidationError::field(
                "rewardKind",
                format!("unknown reward kind '{}'", other),
            ))),
        }
    }
}

/// Reward terms for one side (referrer or customer) of a conversion.
///
/// An amount of zero means that side earns nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTerms {
    pub kind: RewardKind,
    pub amount: Decimal,
}

impl RewardTerms {
    pub fn none() -> Self {
        RewardTerms {
            kind: RewardKind::Cash,
            amount: Decimal::ZERO,
        }
    }

    /// Whether these terms actually issue a reward on conversion.
    pub fn is_payable(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Denormalized campaign counters.
///
/// These are a cache over the referral ledger, kept for dashboards; the
/// ledger remains the source of truth and `recount` re-derives them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignCounters {
    pub referral_count: i32,
    pub conversion_count: i32,
    pub referrer_count: i32,
}

/// Domain model representing a referral campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub referrer_reward: RewardTerms,
    pub customer_reward: RewardTerms,
    #[serde(flatten)]
    pub counters: CampaignCounters,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether the campaign accepts new referrals at `now`.
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active || now < self.start_date {
            return false;
        }
        match self.end_date {
            Some(end) => now <= end,
            None => true,
        }
    }
}

/// Input model for creating a new campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub referrer_reward: RewardTerms,
    pub customer_reward: RewardTerms,
}

impl NewCampaign {
    /// Validates the new campaign data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::field(
                "name",
                "campaign name cannot be empty",
            )));
        }
        if let Some(end) = self.end_date {
            if end <= self.start_date {
                return Err(Error::Validation(ValidationError::field(
                    "endDate",
                    "campaign end date must be after its start date",
                )));
            }
        }
        validate_terms("referrerReward", &self.referrer_reward)?;
        validate_terms("customerReward", &self.customer_reward)?;
        Ok(())
    }
}

/// Input model for updating an existing campaign.
///
/// Reward terms are intentionally immutable after creation: referrals
/// already issued were priced against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl CampaignUpdate {
    /// Validates the campaign update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::field(
                "name",
                "campaign name cannot be empty",
            )));
        }
        Ok(())
    }
}

fn validate_terms(field: &str, terms: &RewardTerms) -> Result<()> {
    if terms.amount < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::field(
            field,
            "reward amount cannot be negative",
        )));
    }
    Ok(())
}
