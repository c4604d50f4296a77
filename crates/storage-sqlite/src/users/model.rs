//! Database model for directory users.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use referra_core::users::{NewCustomer, RoleKind, User, UserRole};

/// Database model for users.
///
/// The tagged-union role is flattened into a discriminant column plus
/// nullable payload columns; `From<UserDB>` reassembles the variant.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub company_name: Option<String>,
    pub business_code: Option<String>,
    pub referrer_code: Option<String>,
    pub business_id: Option<String>,
    pub referred_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDB> for User {
    fn from(db: UserDB) -> Self {
        let role = match db.role.as_str() {
            "BUSINESS" => UserRole::Business {
                company_name: db.company_name.unwrap_or_else(|| db.name.clone()),
                business_code: db.business_code.unwrap_or_default(),
            },
            "REFERRER" => UserRole::Referrer {
                referrer_code: db.referrer_code.unwrap_or_default(),
                business_id: db.business_id,
            },
            "CUSTOMER" => UserRole::Customer {
                business_id: db.business_id.unwrap_or_default(),
                referred_by: db.referred_by,
            },
            "ADMIN" => UserRole::Admin,
            other => {
                log::warn!("User {} has unknown role '{}', treating as customer", db.id, other);
                UserRole::Customer {
                    business_id: db.business_id.unwrap_or_default(),
                    referred_by: db.referred_by,
                }
            }
        };
        Self {
            id: db.id,
            email: db.email,
            name: db.name,
            role,
            created_at: db.created_at.and_utc(),
            updated_at: db.updated_at.and_utc(),
        }
    }
}

impl UserDB {
    /// Row for the customer record created inside the conversion transaction.
    pub fn from_new_customer(new_customer: NewCustomer, now: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: new_customer.email,
            name: new_customer.name,
            role: RoleKind::Customer.as_str().to_string(),
            company_name: None,
            business_code: None,
            referrer_code: None,
            business_id: Some(new_customer.business_id),
            referred_by: new_customer.referred_by,
            created_at: now,
            updated_at: now,
        }
    }
}
