//! Referra Core - Domain entities, services, and traits.
//!
//! This crate contains the referral lifecycle and reward settlement logic.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod analytics;
pub mod campaigns;
pub mod constants;
pub mod errors;
pub mod referrals;
pub mod rewards;
pub mod selections;
pub mod users;

// Re-export common types from the analytics module
pub use analytics::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
