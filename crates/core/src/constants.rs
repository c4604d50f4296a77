//! Application-wide constants.

/// Alphabet used for public referral and redemption codes.
/// Ambiguous glyphs (0/O, 1/I/L) are excluded so codes survive being read
/// aloud or retyped from a screenshot.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Length of a referral share code.
pub const REFERRAL_CODE_LEN: usize = 10;

/// Length of a reward redemption code.
pub const REWARD_CODE_LEN: usize = 12;

/// How many times code generation retries after a unique-constraint
/// collision before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 5;

/// Number of entries in the top-referrers ranking.
pub const TOP_REFERRERS_LIMIT: usize = 5;

/// Number of entries in the recent-activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Default validity window for a referral link, in days.
pub const DEFAULT_REFERRAL_TTL_DAYS: i64 = 30;

/// Default validity window for an issued reward, in days.
pub const DEFAULT_REWARD_TTL_DAYS: i64 = 90;
