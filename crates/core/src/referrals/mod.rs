//! Referrals module - the referral ledger: domain models, services, traits.

mod codes;
mod referrals_errors;
mod referrals_model;
mod referrals_service;
mod referrals_traits;


#[cfg(test)]
mod referrals_service_tests;

// Re-export the public interface
pub use codes::generate_code;
pub use referrals_errors::ReferralError;
pub use referrals_model::{
    is_valid_email, Conversion, ConversionDetails, NewReferral, Referral, ReferralIdent,
    ReferralInvite, ReferralStatus,
};
pub use referrals_service::ReferralService;
pub use referrals_traits::{ReferralRepositoryTrait, ReferralServiceTrait};
