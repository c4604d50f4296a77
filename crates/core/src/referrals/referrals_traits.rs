//! Referral repository and service traits.
//!
//! The mutating repository methods are the atomic units of the referral
//! lifecycle: each one is a single transaction in the storage layer, and
//! every status write inside them is a compare-and-set against the expected
//! current status. Blind overwrites are not part of this contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::referrals_model::{
    Conversion, ConversionDetails, NewReferral, Referral, ReferralIdent, ReferralInvite,
};
use crate::errors::Result;
use crate::users::Actor;

/// Trait defining the contract for Referral repository operations.
#[async_trait]
pub trait ReferralRepositoryTrait: Send + Sync {
    /// Inserts a pending referral and increments the campaign's
    /// `referral_count` in the same transaction. Fails with a unique
    /// violation on a code collision; the caller retries with a new code.
    async fn create(&self, new_referral: NewReferral) -> Result<Referral>;

    /// Records one click event: atomically increments `click_count` and, on
    /// the first click only, CAS `pending → clicked` stamping `clicked_at`.
    /// Fails with `NotFound` for unknown or inactive (expired/rejected)
    /// codes.
    async fn record_click(&self, code: &str, now: DateTime<Utc>) -> Result<Referral>;

    /// The conversion atomic unit: CAS `pending|clicked → converted`,
    /// stamp `converted_at`, attach the conversion details, find-or-create
    /// the customer record, issue one pending reward per payable side of the
    /// campaign's terms, write the reward ids back onto the referral, and
    /// increment the campaign's `conversion_count` — all in one transaction,
    /// or none of it.
    async fn convert(
        &self,
        ident: ReferralIdent,
        details: ConversionDetails,
        now: DateTime<Utc>,
    ) -> Result<Conversion>;

    /// CAS `pending|clicked → expired`. No reward is created.
    async fn expire(&self, referral_id: &str, now: DateTime<Utc>) -> Result<Referral>;

    /// CAS `pending|clicked → rejected`, recording the reason.
    async fn reject(&self, referral_id: &str, reason: &str, now: DateTime<Utc>)
        -> Result<Referral>;

    /// Bulk-expires every pending/clicked referral past its `expires_at`.
    /// Returns the number of rows transitioned.
    async fn expire_due(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Retrieves a referral by its ID.
    fn get_by_id(&self, referral_id: &str) -> Result<Referral>;

    /// Retrieves a referral by its share code.
    fn get_by_code(&self, code: &str) -> Result<Referral>;

    /// The referrer's most recent open (pending/clicked) referral in a
    /// campaign, if any. Used by the code-only landing flow.
    fn find_open_for_referrer(
        &self,
        campaign_id: &str,
        referrer_id: &str,
    ) -> Result<Option<Referral>>;

    /// Lists a business's referrals, newest first.
    fn list_by_business(&self, business_id: &str) -> Result<Vec<Referral>>;

    /// Lists a referrer's referrals, newest first.
    fn list_by_referrer(&self, referrer_id: &str) -> Result<Vec<Referral>>;
}

/// Trait defining the contract for Referral service operations.
#[async_trait]
pub trait ReferralServiceTrait: Send + Sync {
    /// Generates a share link for the acting referrer.
    ///
    /// The campaign must exist (`NotFound`); the referrer must have selected
    /// it, or belong to its business — in which case the selection is
    /// created implicitly, at most once (`Forbidden` otherwise).
    async fn generate_link(
        &self,
        actor: &Actor,
        campaign_id: &str,
        custom_message: Option<String>,
    ) -> Result<ReferralInvite>;

    /// Records a click on a share code.
    async fn track_click(&self, code: &str) -> Result<Referral>;

    /// Finds the open referral for a (campaign, referrer) pair, creating a
    /// fresh pending one when none exists. Backs the
    /// `/refer/{businessCode}/{referrerCode}` landing flow.
    async fn open_referral_for(&self, campaign_id: &str, referrer_id: &str) -> Result<Referral>;

    /// Converts a referral identified by code or id.
    async fn submit_conversion(
        &self,
        ident: ReferralIdent,
        details: ConversionDetails,
    ) -> Result<Conversion>;

    /// Expires a referral; owning business only.
    async fn expire_referral(&self, actor: &Actor, referral_id: &str) -> Result<Referral>;

    /// Rejects a referral as fraudulent/invalid; owning business only.
    async fn reject_referral(
        &self,
        actor: &Actor,
        referral_id: &str,
        reason: &str,
    ) -> Result<Referral>;

    /// Sweeps all overdue referrals. Called by the scheduler.
    async fn expire_due_referrals(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Retrieves a referral the actor may see (its referrer or the owning
    /// business).
    fn get_referral(&self, actor: &Actor, referral_id: &str) -> Result<Referral>;

    /// Lists the acting referrer's referrals.
    fn get_referrals_for_referrer(&self, actor: &Actor) -> Result<Vec<Referral>>;

    /// Lists the acting business's referrals.
    fn get_referrals_for_business(&self, actor: &Actor) -> Result<Vec<Referral>>;
}
