//! Property-based tests for the referral engine's invariants.
//!
//! These verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use proptest::prelude::*;
use std::collections::HashSet;

use referra_core::analytics::conversion_rate;
use referra_core::constants::{CODE_ALPHABET, REFERRAL_CODE_LEN};
use referra_core::referrals::{generate_code, ReferralStatus};
use referra_core::rewards::RewardStatus;

// =============================================================================
// Generators
// =============================================================================

fn arb_referral_status() -> impl Strategy<Value = ReferralStatus> {
    prop_oneof![
        Just(ReferralStatus::Pending),
        Just(ReferralStatus::Clicked),
        Just(ReferralStatus::Converted),
        Just(ReferralStatus::Expired),
        Just(ReferralStatus::Rejected),
    ]
}

fn arb_reward_status() -> impl Strategy<Value = RewardStatus> {
    prop_oneof![
        Just(RewardStatus::Pending),
        Just(RewardStatus::Available),
        Just(RewardStatus::Redeemed),
        Just(RewardStatus::Expired),
    ]
}

// =============================================================================
// Code generation
// =============================================================================

#[test]
fn generated_codes_are_unique_at_scale() {
    let n = 10_000;
    let codes: HashSet<String> = (0..n).map(|_| generate_code(REFERRAL_CODE_LEN)).collect();
    assert_eq!(codes.len(), n);
}

proptest! {
    #[test]
    fn generated_codes_stay_inside_the_alphabet(len in 1usize..32) {
        let code = generate_code(len);
        prop_assert_eq!(code.len(), len);
        prop_assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }
}

// =============================================================================
// Conversion rate
// =============================================================================

proptest! {
    /// The rate is always a percentage and never a division error.
    #[test]
    fn conversion_rate_is_bounded(total in 0usize..10_000, converted_seed in 0usize..10_000) {
        let converted = if total == 0 { 0 } else { converted_seed % (total + 1) };
        let rate = conversion_rate(converted, total);
        prop_assert!(rate <= 100);
        if total == 0 {
            prop_assert_eq!(rate, 0);
        }
    }

    /// Rounds like the spec example: 1 of 3 referrals is 33%.
    #[test]
    fn conversion_rate_matches_manual_rounding(total in 1usize..10_000, converted_seed in 0usize..10_000) {
        let converted = converted_seed % (total + 1);
        let expected = ((converted as f64 / total as f64) * 100.0).round() as u32;
        prop_assert_eq!(conversion_rate(converted, total), expected);
    }
}

#[test]
fn conversion_rate_spec_example() {
    assert_eq!(conversion_rate(1, 3), 33);
}

// =============================================================================
// Status machines
// =============================================================================

proptest! {
    /// No referral transition ever revisits `pending`, and terminal states
    /// admit no further transitions at all.
    #[test]
    fn referral_transitions_are_monotonic(from in arb_referral_status(), to in arb_referral_status()) {
        if from.can_transition_to(to) {
            prop_assert!(to != ReferralStatus::Pending);
            prop_assert!(!from.is_terminal());
            prop_assert!(from != to);
        }
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
    }

    /// Reward transitions follow pending → available → redeemed with expiry
    /// branching off non-terminal states only.
    #[test]
    fn reward_transitions_never_leave_terminal_states(from in arb_reward_status(), to in arb_reward_status()) {
        if from.is_terminal() {
            prop_assert!(!from.can_transition_to(to));
        }
        if from.can_transition_to(to) {
            prop_assert!(to != RewardStatus::Pending);
        }
    }

    /// Walking any random transition sequence preserves reachability rules:
    /// once a walk leaves `pending` it can never observe `pending` again.
    #[test]
    fn referral_walks_never_reenter_pending(steps in proptest::collection::vec(arb_referral_status(), 1..8)) {
        let mut current = ReferralStatus::Pending;
        let mut left_pending = false;
        for next in steps {
            if current.can_transition_to(next) {
                current = next;
            }
            if current != ReferralStatus::Pending {
                left_pending = true;
            }
            if left_pending {
                prop_assert!(current != ReferralStatus::Pending);
            }
        }
    }
}
