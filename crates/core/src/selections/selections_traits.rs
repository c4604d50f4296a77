//! Campaign selection repository trait.

use async_trait::async_trait;

use super::selections_model::{CampaignSelection, SelectionOutcome};
use crate::errors::Result;

/// Contract for the referrer ↔ campaign selection relation.
#[async_trait]
pub trait SelectionRepositoryTrait: Send + Sync {
    /// Idempotently records that `referrer_id` selected `campaign_id`.
    ///
    /// Selecting an already-selected campaign is a no-op that returns the
    /// existing row. Exactly one concurrent caller observes
    /// `newly_selected == true`; that same transaction increments the
    /// campaign's `referrer_count`.
    async fn ensure_selected(
        &self,
        campaign_id: &str,
        referrer_id: &str,
    ) -> Result<SelectionOutcome>;

    /// Looks up an existing selection, if any.
    fn find(&self, campaign_id: &str, referrer_id: &str) -> Result<Option<CampaignSelection>>;
}
