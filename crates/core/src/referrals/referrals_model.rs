//! Referral domain models.

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::rewards::Reward;
use crate::{errors::ValidationError, Error, Result};

/// Referral lifecycle status.
///
/// `Converted`, `Expired` and `Rejected` are terminal; no transition ever
/// returns to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferralStatus {
    #[default]
    Pending,
    Clicked,
    Converted,
    Expired,
    Rejected,
}

impl ReferralStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "PENDING",
            ReferralStatus::Clicked => "CLICKED",
            ReferralStatus::Converted => "CONVERTED",
            ReferralStatus::Expired => "EXPIRED",
            ReferralStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "PENDING" => Ok(ReferralStatus::Pending),
            "CLICKED" => Ok(ReferralStatus::Clicked),
            "CONVERTED" => Ok(ReferralStatus::Converted),
            "EXPIRED" => Ok(ReferralStatus::Expired),
            "REJECTED" => Ok(ReferralStatus::Rejected),
            other => Err(Error::Validation(ValidationError::field(
                "status",
                format!("unknown referral status '{}'", other),
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReferralStatus::Converted | ReferralStatus::Expired | ReferralStatus::Rejected
        )
    }

    /// Whether the referral link still resolves for click tracking.
    pub fn is_link_active(&self) -> bool {
        !matches!(self, ReferralStatus::Expired | ReferralStatus::Rejected)
    }

    /// The directed transition graph of the referral lifecycle.
    /// `pending` may skip `clicked` and move straight to any terminal state.
    pub fn can_transition_to(&self, next: ReferralStatus) -> bool {
        match (self, next) {
            (ReferralStatus::Pending, ReferralStatus::Clicked)
            | (ReferralStatus::Pending, ReferralStatus::Converted)
            | (ReferralStatus::Pending, ReferralStatus::Expired)
            | (ReferralStatus::Pending, ReferralStatus::Rejected)
            | (ReferralStatus::Clicked, ReferralStatus::Converted)
            | (ReferralStatus::Clicked, ReferralStatus::Expired)
            | (ReferralStatus::Clicked, ReferralStatus::Rejected) => true,
            _ => false,
        }
    }
}

/// Domain model representing one referral attempt.
///
/// Financial/audit record: never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: String,
    pub campaign_id: String,
    pub business_id: String,
    pub referrer_id: String,
    /// Globally unique share code.
    pub referral_code: String,
    /// Full shareable link built from the code.
    pub referral_link: String,
    pub custom_message: Option<String>,

    // Referee contact, filled in at conversion time
    pub referee_name: Option<String>,
    pub referee_email: Option<String>,
    pub referee_phone: Option<String>,
    pub notes: Option<String>,

    pub status: ReferralStatus,
    /// Total click events; tracked independently of status.
    pub click_count: i32,

    pub created_at: DateTime<Utc>,
    /// Stamped exactly once, on the first click.
    pub clicked_at: Option<DateTime<Utc>>,
    pub converted_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,

    /// Set if and only if status is `Converted`.
    pub customer_id: Option<String>,
    pub purchase_amount: Option<Decimal>,
    pub transaction_id: Option<String>,
    pub rejected_reason: Option<String>,

    // Back-references to the rewards this referral spawned
    pub referrer_reward_id: Option<String>,
    pub customer_reward_id: Option<String>,

    pub updated_at: DateTime<Utc>,
}

/// Input model for a referral created at link-generation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReferral {
    pub campaign_id: String,
    pub business_id: String,
    pub referrer_id: String,
    pub referral_code: String,
    pub referral_link: String,
    pub custom_message: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// How an operation identifies the referral it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferralIdent {
    Id(String),
    Code(String),
}

/// The link handed back to the referrer after `generate_link`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralInvite {
    pub referral_link: String,
    pub code: String,
}

/// Conversion form payload submitted by the referred prospect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl ConversionDetails {
    /// Validates the conversion form, reporting failures per field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::field(
                "name",
                "name is required",
            )));
        }
        if !is_valid_email(&self.email) {
            return Err(Error::Validation(ValidationError::field(
                "email",
                format!("'{}' is not a valid email address", self.email),
            )));
        }
        if let Some(amount) = self.purchase_amount {
            if amount < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::field(
                    "purchaseAmount",
                    "purchase amount cannot be negative",
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of a successful conversion: the converted referral plus every
/// reward the transaction issued (zero, one, or two).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub referral: Referral,
    pub rewards: Vec<Reward>,
}

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
    })
}

/// Shape check only; deliverability is the mail system's problem.
pub fn is_valid_email(value: &str) -> bool {
    email_regex().is_match(value)
}
