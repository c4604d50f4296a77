#[cfg(test)]
mod tests {
    use crate::campaigns::RewardKind;
    use crate::errors::Result;
    use crate::rewards::{
        Reward, RewardError, RewardRepositoryTrait, RewardService, RewardServiceTrait,
        RewardStatus,
    };
    use crate::users::{Actor, RoleKind};
    use crate::Error;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // --- Mock RewardRepository ---
    //
    // Mirrors the storage CAS semantics in memory: status writes check the
    // expected current status under one lock.
    struct MockRewardRepository {
        rewards: Mutex<HashMap<String, Reward>>,
    }

    impl MockRewardRepository {
        fn new() -> Self {
            Self {
                rewards: Mutex::new(HashMap::new()),
            }
        }

        fn insert(&self, reward: Reward) {
            self.rewards.lock().unwrap().insert(reward.id.clone(), reward);
        }
    }

    #[async_trait]
    impl RewardRepositoryTrait for MockRewardRepository {
        fn get_by_id(&self, reward_id: &str) -> Result<Reward> {
            self.rewards
                .lock()
                .unwrap()
                .get(reward_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("reward {}", reward_id)))
        }

        fn list_by_recipient(&self, user_id: &str) -> Result<Vec<Reward>> {
            Ok(self
                .rewards
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.user_id == user_id)
                .cloned()
                .collect())
        }

        fn list_by_business(&self, business_id: &str) -> Result<Vec<Reward>> {
            Ok(self
                .rewards
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.business_id == business_id)
                .cloned()
                .collect())
        }

        async fn approve(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward> {
            let mut rewards = self.rewards.lock().unwrap();
            let reward = rewards
                .get_mut(reward_id)
                .ok_or_else(|| Error::NotFound(format!("reward {}", reward_id)))?;
            if reward.status != RewardStatus::Pending {
                return Err(Error::Reward(RewardError::InvalidTransition {
                    from: reward.status,
                    to: RewardStatus::Available,
                }));
            }
            reward.status = RewardStatus::Available;
            reward.updated_at = now;
            Ok(reward.clone())
        }

        async fn redeem(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward> {
            let mut rewards = self.rewards.lock().unwrap();
            let reward = rewards
                .get_mut(reward_id)
                .ok_or_else(|| Error::NotFound(format!("reward {}", reward_id)))?;
            match reward.status {
                RewardStatus::Available => {
                    reward.status = RewardStatus::Redeemed;
                    reward.date_redeemed = Some(now);
                    reward.updated_at = now;
                    Ok(reward.clone())
                }
                RewardStatus::Redeemed => Err(Error::Conflict(format!(
                    "reward {} is already redeemed",
                    reward_id
                ))),
                from => Err(Error::Reward(RewardError::InvalidTransition {
                    from,
                    to: RewardStatus::Redeemed,
                })),
            }
        }

        async fn expire(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward> {
            let mut rewards = self.rewards.lock().unwrap();
            let reward = rewards
                .get_mut(reward_id)
                .ok_or_else(|| Error::NotFound(format!("reward {}", reward_id)))?;
            if reward.status.is_terminal() {
                return Err(Error::Reward(RewardError::InvalidTransition {
                    from: reward.status,
                    to: RewardStatus::Expired,
                }));
            }
            reward.status = RewardStatus::Expired;
            reward.updated_at = now;
            Ok(reward.clone())
        }

        async fn expire_due(&self, now: DateTime<Utc>) -> Result<usize> {
            let mut rewards = self.rewards.lock().unwrap();
            let mut count = 0;
            for reward in rewards.values_mut() {
                if !reward.status.is_terminal()
                    && reward.expires_at.map(|e| e < now).unwrap_or(false)
                {
                    reward.status = RewardStatus::Expired;
                    count += 1;
                }
            }
            Ok(count)
        }
    }

    fn test_reward(id: &str, status: RewardStatus) -> Reward {
        let now = Utc::now();
        Reward {
            id: id.to_string(),
            user_id: "usr-referrer".to_string(),
            campaign_id: "cmp-1".to_string(),
            business_id: "biz-1".to_string(),
            kind: RewardKind::Cash,
            amount: dec!(10),
            status,
            description: "Referral reward".to_string(),
            code: format!("RW-{}", id),
            date_earned: now,
            date_redeemed: None,
            expires_at: Some(now + Duration::days(90)),
            created_at: now,
            updated_at: now,
        }
    }

    fn service_with(rewards: Vec<Reward>) -> (RewardService, Arc<MockRewardRepository>) {
        let repo = Arc::new(MockRewardRepository::new());
        for reward in rewards {
            repo.insert(reward);
        }
        (RewardService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_approve_moves_pending_to_available() {
        let (service, _repo) = service_with(vec![test_reward("rw-1", RewardStatus::Pending)]);
        let business = Actor::new("biz-1", RoleKind::Business);

        let approved = service.approve_reward(&business, "rw-1").await.unwrap();
        assert_eq!(approved.status, RewardStatus::Available);

        // A second approval is an invalid transition, not a silent no-op.
        let err = service.approve_reward(&business, "rw-1").await.unwrap_err();
        assert!(err.is_invalid_state(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_approve_requires_owning_business() {
        let (service, _repo) = service_with(vec![test_reward("rw-1", RewardStatus::Pending)]);

        let other = Actor::new("biz-2", RoleKind::Business);
        match service.approve_reward(&other, "rw-1").await {
            Err(Error::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }

        let referrer = Actor::new("usr-referrer", RoleKind::Referrer);
        assert!(service.approve_reward(&referrer, "rw-1").await.is_err());
    }

    #[tokio::test]
    async fn test_redeem_stamps_date_redeemed() {
        let (service, _repo) = service_with(vec![test_reward("rw-1", RewardStatus::Available)]);
        let recipient = Actor::new("usr-referrer", RoleKind::Referrer);

        let redeemed = service.redeem_reward(&recipient, "rw-1").await.unwrap();
        assert_eq!(redeemed.status, RewardStatus::Redeemed);
        assert!(redeemed.date_redeemed.is_some());
    }

    #[tokio::test]
    async fn test_second_redeem_is_a_conflict() {
        let (service, _repo) = service_with(vec![test_reward("rw-1", RewardStatus::Available)]);
        let recipient = Actor::new("usr-referrer", RoleKind::Referrer);

        service.redeem_reward(&recipient, "rw-1").await.unwrap();
        match service.redeem_reward(&recipient, "rw-1").await {
            Err(Error::Conflict(_)) => {}
            other => panic!("expected Conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redeem_pending_is_invalid_state() {
        let (service, _repo) = service_with(vec![test_reward("rw-1", RewardStatus::Pending)]);
        let recipient = Actor::new("usr-referrer", RoleKind::Referrer);

        let err = service.redeem_reward(&recipient, "rw-1").await.unwrap_err();
        assert!(err.is_invalid_state(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_redeem_requires_recipient() {
        let (service, _repo) = service_with(vec![test_reward("rw-1", RewardStatus::Available)]);
        let stranger = Actor::new("usr-other", RoleKind::Customer);

        match service.redeem_reward(&stranger, "rw-1").await {
            Err(Error::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expire_due_skips_redeemed_rewards() {
        let mut due = test_reward("rw-due", RewardStatus::Available);
        due.expires_at = Some(Utc::now() - Duration::days(1));
        let mut redeemed = test_reward("rw-done", RewardStatus::Redeemed);
        redeemed.expires_at = Some(Utc::now() - Duration::days(1));

        let (service, repo) = service_with(vec![due, redeemed]);
        let expired = service.expire_due_rewards(Utc::now()).await.unwrap();
        assert_eq!(expired, 1);

        // A redeemed reward is never expired retroactively.
        assert_eq!(
            repo.get_by_id("rw-done").unwrap().status,
            RewardStatus::Redeemed
        );
    }

    #[test]
    fn test_status_transition_graph() {
        use RewardStatus::*;
        assert!(Pending.can_transition_to(Available));
        assert!(Pending.can_transition_to(Expired));
        assert!(Available.can_transition_to(Redeemed));
        assert!(Available.can_transition_to(Expired));

        assert!(!Pending.can_transition_to(Redeemed));
        assert!(!Redeemed.can_transition_to(Expired));
        assert!(!Expired.can_transition_to(Available));
        assert!(!Redeemed.can_transition_to(Available));
    }
}
