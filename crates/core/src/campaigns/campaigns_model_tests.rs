//! Tests for campaign domain models.

#[cfg(test)]
mod tests {
    use crate::campaigns::{Campaign, CampaignCounters, NewCampaign, RewardKind, RewardTerms};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn base_campaign() -> NewCampaign {
        NewCampaign {
            id: None,
            name: "Spring launch".to_string(),
            description: None,
            start_date: Utc::now(),
            end_date: None,
            is_active: true,
            referrer_reward: RewardTerms {
                kind: RewardKind::Cash,
                amount: dec!(10),
            },
            customer_reward: RewardTerms {
                kind: RewardKind::Discount,
                amount: dec!(25),
            },
        }
    }

    #[test]
    fn test_reward_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&RewardKind::Discount).unwrap(),
            r#""DISCOUNT""#
        );
        assert_eq!(RewardKind::parse("POINTS").unwrap(), RewardKind::Points);
        assert!(RewardKind::parse("VOUCHER").is_err());
    }

    #[test]
    fn test_zero_amount_terms_are_not_payable() {
        assert!(!RewardTerms::none().is_payable());
        let terms = RewardTerms {
            kind: RewardKind::Points,
            amount: dec!(100),
        };
        assert!(terms.is_payable());
    }

    #[test]
    fn test_new_campaign_validation() {
        assert!(base_campaign().validate().is_ok());

        let mut unnamed = base_campaign();
        unnamed.name = "  ".to_string();
        assert!(unnamed.validate().is_err());

        let mut inverted = base_campaign();
        inverted.end_date = Some(inverted.start_date - Duration::days(1));
        assert!(inverted.validate().is_err());

        let mut negative = base_campaign();
        negative.referrer_reward.amount = dec!(-5);
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_campaign_open_window() {
        let now = Utc::now();
        let campaign = Campaign {
            id: "cmp-1".to_string(),
            business_id: "biz-1".to_string(),
            name: "Spring launch".to_string(),
            description: None,
            start_date: now - Duration::days(1),
            end_date: Some(now + Duration::days(1)),
            is_active: true,
            referrer_reward: RewardTerms::none(),
            customer_reward: RewardTerms::none(),
            counters: CampaignCounters::default(),
            created_at: now,
            updated_at: now,
        };

        assert!(campaign.is_open_at(now));
        assert!(!campaign.is_open_at(now + Duration::days(2)));
        assert!(!campaign.is_open_at(now - Duration::days(2)));

        let mut paused = campaign.clone();
        paused.is_active = false;
        assert!(!paused.is_open_at(now));
    }
}
