//! User directory domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};

/// Role discriminant without the role-specific payload.
///
/// This is what authentication hands to the engine: enough to dispatch
/// authorization checks without loading the full directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleKind {
    Business,
    Referrer,
    Customer,
    Admin,
}

impl RoleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleKind::Business => "BUSINESS",
            RoleKind::Referrer => "REFERRER",
            RoleKind::Customer => "CUSTOMER",
            RoleKind::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "BUSINESS" => Ok(RoleKind::Business),
            "REFERRER" => Ok(RoleKind::Referrer),
            "CUSTOMER" => Ok(RoleKind::Customer),
            "ADMIN" => Ok(RoleKind::Admin),
            other => Err(Error::Validation(ValidationError::field(
                "role",
                format!("unknown role '{}'", other),
            ))),
        }
    }
}

/// Role-specific payload, dispatched via an explicit tag rather than
/// inheritance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[serde(rename_all = "camelCase")]
    Business {
        company_name: String,
        /// Public code used in `/refer/{businessCode}` share links.
        business_code: String,
    },
    #[serde(rename_all = "camelCase")]
    Referrer {
        /// Public code used in `/refer/{businessCode}/{referrerCode}` links.
        referrer_code: String,
        /// Company the referrer belongs to, if any. Grants implicit access
        /// to that company's campaigns.
        business_id: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Customer {
        business_id: String,
        /// Referrer that brought this customer in, when known.
        referred_by: Option<String>,
    },
    Admin,
}

impl UserRole {
    pub fn kind(&self) -> RoleKind {
        match self {
            UserRole::Business { .. } => RoleKind::Business,
            UserRole::Referrer { .. } => RoleKind::Referrer,
            UserRole::Customer { .. } => RoleKind::Customer,
            UserRole::Admin => RoleKind::Admin,
        }
    }
}

/// Domain model representing a directory user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(flatten)]
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Company/business the user is associated with, regardless of role.
    pub fn business_id(&self) -> Option<&str> {
        match &self.role {
            UserRole::Business { .. } => Some(self.id.as_str()),
            UserRole::Referrer { business_id, .. } => business_id.as_deref(),
            UserRole::Customer { business_id, .. } => Some(business_id.as_str()),
            UserRole::Admin => None,
        }
    }
}

/// Input model for the customer record created when a referral converts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub email: String,
    pub name: String,
    pub business_id: String,
    pub referred_by: Option<String>,
}

/// Authenticated actor identity handed to every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: String,
    pub role: RoleKind,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: RoleKind) -> Self {
        Actor {
            user_id: user_id.into(),
            role,
        }
    }

    /// Fails with `Forbidden` unless the actor carries the expected role.
    pub fn require_role(&self, role: RoleKind) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "operation requires role {}",
                role.as_str()
            )))
        }
    }
}
