//! Campaign selections module - the referrer ↔ campaign relation.
//!
//! A referrer "selects" a campaign either explicitly or implicitly (by
//! accessing a campaign of their own company). Selection is idempotent;
//! `ensure_selected` is the explicit sub-operation `generate_link` calls
//! instead of mutating membership inline.

mod selections_model;
mod selections_traits;

// Re-export the public interface
pub use selections_model::{CampaignSelection, SelectionOutcome, SelectionStatus};
pub use selections_traits::SelectionRepositoryTrait;
