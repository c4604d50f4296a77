use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use referra_core::users::{RoleKind, User, UserRepositoryTrait};
use referra_core::Result;

use super::model::UserDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::users;
use crate::schema::users::dsl::*;
use crate::utils::chunk_for_sqlite;

/// Read-side repository over the user directory.
///
/// The directory is provisioned externally; this system only reads it
/// (plus the customer inserts done inside the referral conversion
/// transaction, which live in the referral repository).
pub struct UserRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl UserRepository {
    /// Creates a new UserRepository instance
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let user = users
            .select(UserDB::as_select())
            .find(user_id)
            .first::<UserDB>(&mut conn)
            .into_core()?;
        Ok(user.into())
    }

    fn get_by_email(&self, email_param: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let user = users
            .select(UserDB::as_select())
            .filter(email.eq(email_param))
            .first::<UserDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(user.map(User::from))
    }

    fn get_by_business_code(&self, code: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let user = users
            .select(UserDB::as_select())
            .filter(business_code.eq(code))
            .first::<UserDB>(&mut conn)
            .into_core()?;
        Ok(user.into())
    }

    fn get_by_referrer_code(&self, code: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let user = users
            .select(UserDB::as_select())
            .filter(referrer_code.eq(code))
            .first::<UserDB>(&mut conn)
            .into_core()?;
        Ok(user.into())
    }

    fn list_by_ids(&self, user_ids: &[String]) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        let mut results = Vec::with_capacity(user_ids.len());
        for chunk in chunk_for_sqlite(user_ids) {
            let rows = users::table
                .select(UserDB::as_select())
                .filter(id.eq_any(chunk))
                .load::<UserDB>(&mut conn)
                .into_core()?;
            results.extend(rows.into_iter().map(User::from));
        }
        Ok(results)
    }

    fn count_customers(&self, business_id_param: &str) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        users
            .filter(role.eq(RoleKind::Customer.as_str()))
            .filter(business_id.eq(business_id_param))
            .count()
            .get_result::<i64>(&mut conn)
            .into_core()
    }
}
