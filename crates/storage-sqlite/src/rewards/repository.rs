use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use referra_core::constants::{MAX_CODE_ATTEMPTS, REWARD_CODE_LEN};
use referra_core::referrals::generate_code;
use referra_core::rewards::{NewReward, Reward, RewardError, RewardRepositoryTrait, RewardStatus};
use referra_core::{Error, Result};

use super::model::RewardDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::rewards;

/// Repository for the reward ledger
pub struct RewardRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl RewardRepository {
    /// Creates a new RewardRepository instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

/// Inserts a reward inside an existing write transaction.
///
/// Used by the referral conversion path so referral transition and reward
/// issuance commit (or roll back) together. Redemption codes are checked
/// against the table before insert; with writes serialized through the
/// actor this cannot race, and the unique index remains as a backstop.
pub(crate) fn insert_new_reward_in_tx(
    conn: &mut SqliteConnection,
    new_reward: NewReward,
    now: DateTime<Utc>,
) -> Result<RewardDB> {
    let mut code = generate_code(REWARD_CODE_LEN);
    for _ in 0..MAX_CODE_ATTEMPTS {
        let taken: i64 = rewards::table
            .filter(rewards::code.eq(&code))
            .count()
            .get_result(conn)
            .into_core()?;
        if taken == 0 {
            break;
        }
        code = generate_code(REWARD_CODE_LEN);
    }

    let reward_db = RewardDB::from_new(new_reward, code, now.naive_utc());
    diesel::insert_into(rewards::table)
        .values(&reward_db)
        .execute(conn)
        .into_core()?;
    Ok(reward_db)
}

fn load_reward(conn: &mut SqliteConnection, reward_id: &str) -> Result<RewardDB> {
    rewards::table
        .select(RewardDB::as_select())
        .find(reward_id)
        .first::<RewardDB>(conn)
        .into_core()
}

#[async_trait]
impl RewardRepositoryTrait for RewardRepository {
    fn get_by_id(&self, reward_id: &str) -> Result<Reward> {
        let mut conn = get_connection(&self.pool)?;
        let reward = load_reward(&mut conn, reward_id)?;
        Ok(reward.into())
    }

    fn list_by_recipient(&self, user_id: &str) -> Result<Vec<Reward>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = rewards::table
            .select(RewardDB::as_select())
            .filter(rewards::user_id.eq(user_id))
            .order(rewards::date_earned.desc())
            .load::<RewardDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Reward::from).collect())
    }

    fn list_by_business(&self, business_id: &str) -> Result<Vec<Reward>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = rewards::table
            .select(RewardDB::as_select())
            .filter(rewards::business_id.eq(business_id))
            .order(rewards::date_earned.desc())
            .load::<RewardDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Reward::from).collect())
    }

    async fn approve(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward> {
        let reward_id_owned = reward_id.to_string();
        self.writer
            .exec(move |conn| {
                let current = load_reward(conn, &reward_id_owned)?;
                let status = RewardStatus::parse(&current.status)?;
                if status != RewardStatus::Pending {
                    return Err(Error::Reward(RewardError::InvalidTransition {
                        from: status,
                        to: RewardStatus::Available,
                    }));
                }

                // Guarded write: only flips the row if it is still pending.
                let updated = diesel::update(
                    rewards::table
                        .find(&reward_id_owned)
                        .filter(rewards::status.eq(RewardStatus::Pending.as_str())),
                )
                .set((
                    rewards::status.eq(RewardStatus::Available.as_str()),
                    rewards::updated_at.eq(now.naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                if updated == 0 {
                    return Err(Error::Reward(RewardError::InvalidTransition {
                        from: status,
                        to: RewardStatus::Available,
                    }));
                }

                Ok(Reward::from(load_reward(conn, &reward_id_owned)?))
            })
            .await
    }

    async fn redeem(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward> {
        let reward_id_owned = reward_id.to_string();
        self.writer
            .exec(move |conn| {
                let current = load_reward(conn, &reward_id_owned)?;
                match RewardStatus::parse(&current.status)? {
                    RewardStatus::Available => {}
                    // The loser of a concurrent redemption race lands here.
                    RewardStatus::Redeemed => {
                        return Err(Error::Conflict(format!(
                            "reward {} is already redeemed",
                            reward_id_owned
                        )));
                    }
                    from => {
                        return Err(Error::Reward(RewardError::InvalidTransition {
                            from,
                            to: RewardStatus::Redeemed,
                        }));
                    }
                }

                let updated = diesel::update(
                    rewards::table
                        .find(&reward_id_owned)
                        .filter(rewards::status.eq(RewardStatus::Available.as_str())),
                )
                .set((
                    rewards::status.eq(RewardStatus::Redeemed.as_str()),
                    rewards::date_redeemed.eq(Some(now.naive_utc())),
                    rewards::updated_at.eq(now.naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                if updated == 0 {
                    return Err(Error::Conflict(format!(
                        "reward {} is already redeemed",
                        reward_id_owned
                    )));
                }

                Ok(Reward::from(load_reward(conn, &reward_id_owned)?))
            })
            .await
    }

    async fn expire(&self, reward_id: &str, now: DateTime<Utc>) -> Result<Reward> {
        let reward_id_owned = reward_id.to_string();
        self.writer
            .exec(move |conn| {
                let current = load_reward(conn, &reward_id_owned)?;
                let status = RewardStatus::parse(&current.status)?;
                if !status.can_transition_to(RewardStatus::Expired) {
                    return Err(Error::Reward(RewardError::InvalidTransition {
                        from: status,
                        to: RewardStatus::Expired,
                    }));
                }

                diesel::update(
                    rewards::table.find(&reward_id_owned).filter(
                        rewards::status.eq_any([
                            RewardStatus::Pending.as_str(),
                            RewardStatus::Available.as_str(),
                        ]),
                    ),
                )
                .set((
                    rewards::status.eq(RewardStatus::Expired.as_str()),
                    rewards::updated_at.eq(now.naive_utc()),
                ))
                .execute(conn)
                .into_core()?;

                Ok(Reward::from(load_reward(conn, &reward_id_owned)?))
            })
            .await
    }

    async fn expire_due(&self, now: DateTime<Utc>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let expired = diesel::update(
                    rewards::table
                        .filter(rewards::status.eq_any([
                            RewardStatus::Pending.as_str(),
                            RewardStatus::Available.as_str(),
                        ]))
                        .filter(rewards::expires_at.le(now.naive_utc())),
                )
                .set((
                    rewards::status.eq(RewardStatus::Expired.as_str()),
                    rewards::updated_at.eq(now.naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                Ok(expired)
            })
            .await
    }
}
