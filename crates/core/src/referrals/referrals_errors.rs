//! Referral ledger error types.

use thiserror::Error;

use super::referrals_model::ReferralStatus;

/// Errors specific to referral lifecycle operations.
#[derive(Error, Debug)]
pub enum ReferralError {
    #[error("referral cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        from: ReferralStatus,
        to: ReferralStatus,
    },

    #[error("referral code space exhausted after {0} attempts")]
    CodeSpaceExhausted(usize),
}
