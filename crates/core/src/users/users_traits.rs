//! User directory repository trait.
//!
//! The directory itself (onboarding, credentials, profile management) lives
//! outside this system; the engine only reads identities and counts, and the
//! conversion path creates customer records through the referral ledger's
//! own transaction.

use super::users_model::User;
use crate::errors::Result;

/// Read-side contract for the user directory.
pub trait UserRepositoryTrait: Send + Sync {
    /// Retrieves a user by id.
    fn get_by_id(&self, user_id: &str) -> Result<User>;

    /// Retrieves a user by email, if present.
    fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Resolves a business user from its public share-link code.
    fn get_by_business_code(&self, business_code: &str) -> Result<User>;

    /// Resolves a referrer from its public share-link code.
    fn get_by_referrer_code(&self, referrer_code: &str) -> Result<User>;

    /// Loads a batch of users by id. Missing ids are skipped.
    fn list_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>>;

    /// Number of customer records associated with a business.
    fn count_customers(&self, business_id: &str) -> Result<i64>;
}
