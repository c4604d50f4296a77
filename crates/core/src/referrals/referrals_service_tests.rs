#[cfg(test)]
mod tests {
    use crate::campaigns::{
        Campaign, CampaignCounters, CampaignRepositoryTrait, CampaignUpdate, NewCampaign,
        RewardKind, RewardTerms,
    };
    use crate::errors::{DatabaseError, Result};
    use crate::referrals::{
        Conversion, ConversionDetails, NewReferral, Referral, ReferralIdent,
        ReferralRepositoryTrait, ReferralService, ReferralServiceTrait, ReferralStatus,
    };
    use crate::selections::{
        CampaignSelection, SelectionOutcome, SelectionRepositoryTrait, SelectionStatus,
    };
    use crate::users::{Actor, RoleKind, User, UserRepositoryTrait, UserRole};
    use crate::Error;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    // --- Mock ReferralRepository ---
    #[derive(Default)]
    struct MockReferralRepository {
        referrals: Mutex<HashMap<String, Referral>>,
        create_calls: Mutex<usize>,
        // Number of upcoming create() calls that should fail as collisions.
        collisions_remaining: Mutex<usize>,
    }

    impl MockReferralRepository {
        fn with_collisions(n: usize) -> Self {
            let repo = Self::default();
            *repo.collisions_remaining.lock().unwrap() = n;
            repo
        }

        fn materialize(new_referral: NewReferral, now: DateTime<Utc>) -> Referral {
            Referral {
                id: format!("ref-{}", new_referral.referral_code),
                campaign_id: new_referral.campaign_id,
                business_id: new_referral.business_id,
                referrer_id: new_referral.referrer_id,
                referral_code: new_referral.referral_code,
                referral_link: new_referral.referral_link,
                custom_message: new_referral.custom_message,
                referee_name: None,
                referee_email: None,
                referee_phone: None,
                notes: None,
                status: ReferralStatus::Pending,
                click_count: 0,
                created_at: now,
                clicked_at: None,
                converted_at: None,
                expires_at: new_referral.expires_at,
                customer_id: None,
                purchase_amount: None,
                transaction_id: None,
                rejected_reason: None,
                referrer_reward_id: None,
                customer_reward_id: None,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl ReferralRepositoryTrait for MockReferralRepository {
        async fn create(&self, new_referral: NewReferral) -> Result<Referral> {
            *self.create_calls.lock().unwrap() += 1;
            {
                let mut collisions = self.collisions_remaining.lock().unwrap();
                if *collisions > 0 {
                    *collisions -= 1;
                    return Err(Error::Database(DatabaseError::UniqueViolation(
                        "referrals.referral_code".to_string(),
                    )));
                }
            }
            let referral = Self::materialize(new_referral, Utc::now());
            self.referrals
                .lock()
                .unwrap()
                .insert(referral.id.clone(), referral.clone());
            Ok(referral)
        }

        async fn record_click(&self, code: &str, now: DateTime<Utc>) -> Result<Referral> {
            let mut referrals = self.referrals.lock().unwrap();
            let referral = referrals
                .values_mut()
                .find(|r| r.referral_code == code)
                .ok_or_else(|| Error::NotFound(format!("referral code {}", code)))?;
            if !referral.status.is_link_active() {
                return Err(Error::NotFound(format!("referral code {}", code)));
            }
            referral.click_count += 1;
            if referral.status == ReferralStatus::Pending {
                referral.status = ReferralStatus::Clicked;
                referral.clicked_at = Some(now);
            }
            Ok(referral.clone())
        }

        async fn convert(
            &self,
            ident: ReferralIdent,
            details: ConversionDetails,
            now: DateTime<Utc>,
        ) -> Result<Conversion> {
            let mut referrals = self.referrals.lock().unwrap();
            let referral = match &ident {
                ReferralIdent::Id(id) => referrals.get_mut(id.as_str()),
                ReferralIdent::Code(code) => {
                    referrals.values_mut().find(|r| r.referral_code == *code)
                }
            }
            .ok_or_else(|| Error::NotFound("referral".to_string()))?;
            if referral.status.is_terminal() {
                return Err(Error::Referral(
                    crate::referrals::ReferralError::InvalidTransition {
                        from: referral.status,
                        to: ReferralStatus::Converted,
                    },
                ));
            }
            referral.status = ReferralStatus::Converted;
            referral.converted_at = Some(now);
            referral.customer_id = Some("usr-customer".to_string());
            referral.referee_name = Some(details.name);
            referral.referee_email = Some(details.email);
            referral.purchase_amount = details.purchase_amount;
            Ok(Conversion {
                referral: referral.clone(),
                rewards: Vec::new(),
            })
        }

        async fn expire(&self, referral_id: &str, now: DateTime<Utc>) -> Result<Referral> {
            let mut referrals = self.referrals.lock().unwrap();
            let referral = referrals
                .get_mut(referral_id)
                .ok_or_else(|| Error::NotFound(format!("referral {}", referral_id)))?;
            referral.status = ReferralStatus::Expired;
            referral.updated_at = now;
            Ok(referral.clone())
        }

        async fn reject(
            &self,
            referral_id: &str,
            reason: &str,
            now: DateTime<Utc>,
        ) -> Result<Referral> {
            let mut referrals = self.referrals.lock().unwrap();
            let referral = referrals
                .get_mut(referral_id)
                .ok_or_else(|| Error::NotFound(format!("referral {}", referral_id)))?;
            referral.status = ReferralStatus::Rejected;
            referral.rejected_reason = Some(reason.to_string());
            referral.updated_at = now;
            Ok(referral.clone())
        }

        async fn expire_due(&self, _now: DateTime<Utc>) -> Result<usize> {
            Ok(0)
        }

        fn get_by_id(&self, referral_id: &str) -> Result<Referral> {
            self.referrals
                .lock()
                .unwrap()
                .get(referral_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("referral {}", referral_id)))
        }

        fn get_by_code(&self, code: &str) -> Result<Referral> {
            self.referrals
                .lock()
                .unwrap()
                .values()
                .find(|r| r.referral_code == code)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("referral code {}", code)))
        }

        fn find_open_for_referrer(
            &self,
            campaign_id: &str,
            referrer_id: &str,
        ) -> Result<Option<Referral>> {
            Ok(self
                .referrals
                .lock()
                .unwrap()
                .values()
                .find(|r| {
                    r.campaign_id == campaign_id
                        && r.referrer_id == referrer_id
                        && !r.status.is_terminal()
                })
                .cloned())
        }

        fn list_by_business(&self, business_id: &str) -> Result<Vec<Referral>> {
            Ok(self
                .referrals
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.business_id == business_id)
                .cloned()
                .collect())
        }

        fn list_by_referrer(&self, referrer_id: &str) -> Result<Vec<Referral>> {
            Ok(self
                .referrals
                .lock()
                .unwrap()
                .values()
                .filter(|r| r.referrer_id == referrer_id)
                .cloned()
                .collect())
        }
    }

    // --- Mock CampaignRepository ---
    struct MockCampaignRepository {
        campaigns: Mutex<HashMap<String, Campaign>>,
    }

    impl MockCampaignRepository {
        fn with(campaigns: Vec<Campaign>) -> Self {
            Self {
                campaigns: Mutex::new(
                    campaigns.into_iter().map(|c| (c.id.clone(), c)).collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl CampaignRepositoryTrait for MockCampaignRepository {
        async fn create(&self, _business_id: &str, _new_campaign: NewCampaign) -> Result<Campaign> {
            unimplemented!()
        }

        async fn update(&self, _campaign_update: CampaignUpdate) -> Result<Campaign> {
            unimplemented!()
        }

        fn get_by_id(&self, campaign_id: &str) -> Result<Campaign> {
            self.campaigns
                .lock()
                .unwrap()
                .get(campaign_id)
                .cloned()
                .ok_or_else(|| {
                    Error::Database(DatabaseError::NotFound(format!(
                        "campaign {}",
                        campaign_id
                    )))
                })
        }

        fn list_by_business(&self, business_id: &str, _active_only: bool) -> Result<Vec<Campaign>> {
            Ok(self
                .campaigns
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.business_id == business_id)
                .cloned()
                .collect())
        }

        fn find_default_for_business(&self, business_id: &str) -> Result<Option<Campaign>> {
            Ok(self
                .campaigns
                .lock()
                .unwrap()
                .values()
                .find(|c| c.business_id == business_id && c.is_active)
                .cloned())
        }

        async fn recount(&self, _campaign_id: &str) -> Result<CampaignCounters> {
            unimplemented!()
        }
    }

    // --- Mock SelectionRepository ---
    #[derive(Default)]
    struct MockSelectionRepository {
        selected: Mutex<HashSet<(String, String)>>,
    }

    impl MockSelectionRepository {
        fn preselect(&self, campaign_id: &str, referrer_id: &str) {
            self.selected
                .lock()
                .unwrap()
                .insert((campaign_id.to_string(), referrer_id.to_string()));
        }

        fn selection_for(campaign_id: &str, referrer_id: &str) -> CampaignSelection {
            CampaignSelection {
                id: format!("sel-{}-{}", campaign_id, referrer_id),
                campaign_id: campaign_id.to_string(),
                referrer_id: referrer_id.to_string(),
                status: SelectionStatus::Active,
                selected_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl SelectionRepositoryTrait for MockSelectionRepository {
        async fn ensure_selected(
            &self,
            campaign_id: &str,
            referrer_id: &str,
        ) -> Result<SelectionOutcome> {
            let newly_selected = self
                .selected
                .lock()
                .unwrap()
                .insert((campaign_id.to_string(), referrer_id.to_string()));
            Ok(SelectionOutcome {
                selection: Self::selection_for(campaign_id, referrer_id),
                newly_selected,
            })
        }

        fn find(&self, campaign_id: &str, referrer_id: &str) -> Result<Option<CampaignSelection>> {
            let selected = self.selected.lock().unwrap();
            Ok(selected
                .contains(&(campaign_id.to_string(), referrer_id.to_string()))
                .then(|| Self::selection_for(campaign_id, referrer_id)))
        }
    }

    // --- Mock UserRepository ---
    struct MockUserRepository {
        users: Mutex<HashMap<String, User>>,
    }

    impl MockUserRepository {
        fn with(users: Vec<User>) -> Self {
            Self {
                users: Mutex::new(users.into_iter().map(|u| (u.id.clone(), u)).collect()),
            }
        }
    }

    impl UserRepositoryTrait for MockUserRepository {
        fn get_by_id(&self, user_id: &str) -> Result<User> {
            self.users
                .lock()
                .unwrap()
                .get(user_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
        }

        fn get_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .values()
                .find(|u| u.email == email)
                .cloned())
        }

        fn get_by_business_code(&self, _business_code: &str) -> Result<User> {
            unimplemented!()
        }

        fn get_by_referrer_code(&self, _referrer_code: &str) -> Result<User> {
            unimplemented!()
        }

        fn list_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
            let users = self.users.lock().unwrap();
            Ok(user_ids.iter().filter_map(|id| users.get(id).cloned()).collect())
        }

        fn count_customers(&self, _business_id: &str) -> Result<i64> {
            Ok(0)
        }
    }

    // --- Fixtures ---

    fn test_campaign(id: &str, business_id: &str) -> Campaign {
        let now = Utc::now();
        Campaign {
            id: id.to_string(),
            business_id: business_id.to_string(),
            name: "Launch".to_string(),
            description: None,
            start_date: now,
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
            counters: CampaignCounters::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn test_referrer(id: &str, business_id: Option<&str>) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            name: id.to_string(),
            role: UserRole::Referrer {
                referrer_code: format!("CODE-{}", id),
                business_id: business_id.map(str::to_string),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    struct Fixture {
        service: ReferralService,
        referral_repo: Arc<MockReferralRepository>,
        selection_repo: Arc<MockSelectionRepository>,
    }

    fn fixture(collisions: usize, campaigns: Vec<Campaign>, users: Vec<User>) -> Fixture {
        let referral_repo = Arc::new(MockReferralRepository::with_collisions(collisions));
        let selection_repo = Arc::new(MockSelectionRepository::default());
        let service = ReferralService::new(
            referral_repo.clone(),
            Arc::new(MockCampaignRepository::with(campaigns)),
            selection_repo.clone(),
            Arc::new(MockUserRepository::with(users)),
            "https://ref.example.com/".to_string(),
            30,
        );
        Fixture {
            service,
            referral_repo,
            selection_repo,
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn test_generate_link_with_explicit_selection() {
        let fx = fixture(
            0,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", None)],
        );
        fx.selection_repo.preselect("cmp-1", "usr-1");
        let actor = Actor::new("usr-1", RoleKind::Referrer);

        let invite = fx
            .service
            .generate_link(&actor, "cmp-1", Some("join us".to_string()))
            .await
            .unwrap();

        assert_eq!(invite.code.len(), crate::constants::REFERRAL_CODE_LEN);
        assert_eq!(
            invite.referral_link,
            format!("https://ref.example.com/r/{}", invite.code)
        );

        let referral = fx.referral_repo.get_by_code(&invite.code).unwrap();
        assert_eq!(referral.status, ReferralStatus::Pending);
        assert_eq!(referral.custom_message.as_deref(), Some("join us"));
        assert!(referral.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_generate_link_self_heals_same_company_membership() {
        let fx = fixture(
            0,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", Some("biz-1"))],
        );
        let actor = Actor::new("usr-1", RoleKind::Referrer);

        fx.service.generate_link(&actor, "cmp-1", None).await.unwrap();
        assert!(fx.selection_repo.find("cmp-1", "usr-1").unwrap().is_some());

        // Second call: already selected, still exactly one selection row.
        fx.service.generate_link(&actor, "cmp-1", None).await.unwrap();
        assert_eq!(fx.selection_repo.selected.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_link_forbidden_without_access() {
        let fx = fixture(
            0,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", Some("biz-other"))],
        );
        let actor = Actor::new("usr-1", RoleKind::Referrer);

        match fx.service.generate_link(&actor, "cmp-1", None).await {
            Err(Error::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
        // Access denial must not leak a selection row.
        assert!(fx.selection_repo.selected.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generate_link_unknown_campaign() {
        let fx = fixture(0, vec![], vec![test_referrer("usr-1", None)]);
        let actor = Actor::new("usr-1", RoleKind::Referrer);

        match fx.service.generate_link(&actor, "cmp-missing", None).await {
            Err(Error::Database(DatabaseError::NotFound(_))) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_link_requires_referrer_role() {
        let fx = fixture(0, vec![test_campaign("cmp-1", "biz-1")], vec![]);
        let actor = Actor::new("biz-1", RoleKind::Business);

        match fx.service.generate_link(&actor, "cmp-1", None).await {
            Err(Error::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_link_retries_code_collisions() {
        let fx = fixture(
            2,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", Some("biz-1"))],
        );
        let actor = Actor::new("usr-1", RoleKind::Referrer);

        let invite = fx.service.generate_link(&actor, "cmp-1", None).await.unwrap();
        assert!(!invite.code.is_empty());
        assert_eq!(*fx.referral_repo.create_calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_click_counting_and_single_stamp() {
        let fx = fixture(
            0,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", Some("biz-1"))],
        );
        let actor = Actor::new("usr-1", RoleKind::Referrer);
        let invite = fx.service.generate_link(&actor, "cmp-1", None).await.unwrap();

        let first = fx.service.track_click(&invite.code).await.unwrap();
        assert_eq!(first.status, ReferralStatus::Clicked);
        assert_eq!(first.click_count, 1);
        let stamp = first.clicked_at.unwrap();

        let third = {
            fx.service.track_click(&invite.code).await.unwrap();
            fx.service.track_click(&invite.code).await.unwrap()
        };
        assert_eq!(third.click_count, 3);
        assert_eq!(third.clicked_at.unwrap(), stamp);
    }

    #[tokio::test]
    async fn test_track_click_unknown_code() {
        let fx = fixture(0, vec![], vec![]);
        match fx.service.track_click("NOPE").await {
            Err(Error::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_conversion_validates_before_touching_the_ledger() {
        let fx = fixture(0, vec![], vec![]);
        let details = ConversionDetails {
            name: "Pat".to_string(),
            email: "broken".to_string(),
            phone: None,
            notes: None,
            purchase_amount: None,
            transaction_id: None,
        };

        let err = fx
            .service
            .submit_conversion(ReferralIdent::Code("ANY".to_string()), details)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_open_referral_for_reuses_open_rows() {
        let fx = fixture(
            0,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", Some("biz-1"))],
        );

        let first = fx.service.open_referral_for("cmp-1", "usr-1").await.unwrap();
        let second = fx.service.open_referral_for("cmp-1", "usr-1").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(*fx.referral_repo.create_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reject_requires_owning_business() {
        let fx = fixture(
            0,
            vec![test_campaign("cmp-1", "biz-1")],
            vec![test_referrer("usr-1", Some("biz-1"))],
        );
        let referrer = Actor::new("usr-1", RoleKind::Referrer);
        let invite = fx.service.generate_link(&referrer, "cmp-1", None).await.unwrap();
        let referral = fx.referral_repo.get_by_code(&invite.code).unwrap();

        let other_business = Actor::new("biz-2", RoleKind::Business);
        match fx
            .service
            .reject_referral(&other_business, &referral.id, "fraud")
            .await
        {
            Err(Error::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }

        let owner = Actor::new("biz-1", RoleKind::Business);
        let rejected = fx
            .service
            .reject_referral(&owner, &referral.id, "fraud")
            .await
            .unwrap();
        assert_eq!(rejected.status, ReferralStatus::Rejected);
        assert_eq!(rejected.rejected_reason.as_deref(), Some("fraud"));
    }
}
