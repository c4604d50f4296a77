//! Tests for user directory domain models.

#[cfg(test)]
mod tests {
    use crate::users::{Actor, RoleKind, User, UserRole};
    use crate::Error;
    use chrono::Utc;

    fn referrer_user() -> User {
        User {
            id: "usr-1".to_string(),
            email: "rae@example.com".to_string(),
            name: "Rae".to_string(),
            role: UserRole::Referrer {
                referrer_code: "RAE42".to_string(),
                business_id: Some("biz-1".to_string()),
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_kind_round_trips_through_strings() {
        for kind in [
            RoleKind::Business,
            RoleKind::Referrer,
            RoleKind::Customer,
            RoleKind::Admin,
        ] {
            assert_eq!(RoleKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(RoleKind::parse("OWNER").is_err());
    }

    #[test]
    fn test_role_serializes_with_explicit_tag() {
        let user = referrer_user();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "REFERRER");
        assert_eq!(json["referrerCode"], "RAE42");
    }

    #[test]
    fn test_business_id_follows_the_role_payload() {
        let user = referrer_user();
        assert_eq!(user.business_id(), Some("biz-1"));

        let business = User {
            role: UserRole::Business {
                company_name: "Acme".to_string(),
                business_code: "ACME".to_string(),
            },
            ..referrer_user()
        };
        assert_eq!(business.business_id(), Some("usr-1"));
    }

    #[test]
    fn test_actor_role_check() {
        let actor = Actor::new("usr-1", RoleKind::Referrer);
        assert!(actor.require_role(RoleKind::Referrer).is_ok());
        match actor.require_role(RoleKind::Business) {
            Err(Error::Forbidden(_)) => {}
            other => panic!("expected Forbidden, got {:?}", other),
        }
    }
}
