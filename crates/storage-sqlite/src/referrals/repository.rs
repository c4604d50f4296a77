use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use referra_core::campaigns::Campaign;
use referra_core::referrals::{
    Conversion, ConversionDetails, NewReferral, Referral, ReferralError, ReferralIdent,
    ReferralRepositoryTrait, ReferralStatus,
};
use referra_core::rewards::{NewReward, Reward};
use referra_core::users::NewCustomer;
use referra_core::{Error, Result};

use super::model::ReferralDB;
use crate::campaigns::model::CampaignDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::rewards::repository::insert_new_reward_in_tx;
use crate::schema::{campaigns, referrals, users};
use crate::users::model::UserDB;

const OPEN_STATUSES: [&str; 2] = ["PENDING", "CLICKED"];

/// Repository for the referral ledger.
///
/// The mutating methods are the lifecycle's atomic units: each runs as one
/// job on the writer actor, inside one immediate transaction, and every
/// status UPDATE carries an expected-status filter.
pub struct ReferralRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
    /// Validity window stamped on rewards issued at conversion time.
    reward_ttl_days: i64,
}

impl ReferralRepository {
    /// Creates a new ReferralRepository instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
        reward_ttl_days: i64,
    ) -> Self {
        Self {
            pool,
            writer,
            reward_ttl_days,
        }
    }
}

fn load_by_ident(conn: &mut SqliteConnection, ident: &ReferralIdent) -> Result<ReferralDB> {
    let row = match ident {
        ReferralIdent::Id(referral_id) => referrals::table
            .select(ReferralDB::as_select())
            .find(referral_id)
            .first::<ReferralDB>(conn)
            .optional()
            .into_core()?,
        ReferralIdent::Code(code) => referrals::table
            .select(ReferralDB::as_select())
            .filter(referrals::referral_code.eq(code))
            .first::<ReferralDB>(conn)
            .optional()
            .into_core()?,
    };
    row.ok_or_else(|| match ident {
        ReferralIdent::Id(referral_id) => Error::NotFound(format!("referral {}", referral_id)),
        ReferralIdent::Code(code) => Error::NotFound(format!("referral code {}", code)),
    })
}

fn reload(conn: &mut SqliteConnection, referral_id: &str) -> Result<Referral> {
    let row = referrals::table
        .select(ReferralDB::as_select())
        .find(referral_id)
        .first::<ReferralDB>(conn)
        .into_core()?;
    Ok(row.into())
}

/// CAS a referral out of the open statuses into a terminal one.
fn close_referral(
    conn: &mut SqliteConnection,
    referral_id: &str,
    to: ReferralStatus,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Referral> {
    let current = referrals::table
        .select(ReferralDB::as_select())
        .find(referral_id)
        .first::<ReferralDB>(conn)
        .optional()
        .into_core()?
        .ok_or_else(|| Error::NotFound(format!("referral {}", referral_id)))?;
    let from = ReferralStatus::parse(&current.status)?;
    if !from.can_transition_to(to) {
        return Err(Error::Referral(ReferralError::InvalidTransition { from, to }));
    }

    let updated = diesel::update(
        referrals::table
            .find(referral_id)
            .filter(referrals::status.eq_any(OPEN_STATUSES)),
    )
    .set((
        referrals::status.eq(to.as_str()),
        referrals::rejected_reason.eq(reason),
        referrals::updated_at.eq(now.naive_utc()),
    ))
    .execute(conn)
    .into_core()?;
    if updated == 0 {
        return Err(Error::Referral(ReferralError::InvalidTransition { from, to }));
    }

    reload(conn, referral_id)
}

#[async_trait]
impl ReferralRepositoryTrait for ReferralRepository {
    async fn create(&self, new_referral: NewReferral) -> Result<Referral> {
        self.writer
            .exec(move |conn| {
                let now = chrono::Utc::now().naive_utc();
                let campaign_id = new_referral.campaign_id.clone();
                let referral_db = ReferralDB::from_new(new_referral, now);

                diesel::insert_into(referrals::table)
                    .values(&referral_db)
                    .execute(conn)
                    .into_core()?;

                // Cache counter; rides in the same transaction as the insert
                diesel::update(campaigns::table.find(&campaign_id))
                    .set(campaigns::referral_count.eq(campaigns::referral_count + 1))
                    .execute(conn)
                    .into_core()?;

                Ok(Referral::from(referral_db))
            })
            .await
    }

    async fn record_click(&self, code: &str, now: DateTime<Utc>) -> Result<Referral> {
        let code_owned = code.to_string();
        self.writer
            .exec(move |conn| {
                let current = load_by_ident(conn, &ReferralIdent::Code(code_owned.clone()))?;
                let status = ReferralStatus::parse(&current.status)?;
                if !status.is_link_active() {
                    return Err(Error::NotFound(format!(
                        "referral code {} is no longer active",
                        code_owned
                    )));
                }

                if status == ReferralStatus::Pending {
                    // First click: transition and stamp, guarded on the row
                    // still being pending so clicked_at is written only once.
                    let transitioned = diesel::update(
                        referrals::table
                            .find(&current.id)
                            .filter(referrals::status.eq(ReferralStatus::Pending.as_str())),
                    )
                    .set((
                        referrals::status.eq(ReferralStatus::Clicked.as_str()),
                        referrals::clicked_at.eq(Some(now.naive_utc())),
                        referrals::click_count.eq(referrals::click_count + 1),
                        referrals::updated_at.eq(now.naive_utc()),
                    ))
                    .execute(conn)
                    .into_core()?;

                    if transitioned == 0 {
                        // Another click won the transition between our read
                        // and write; this one still counts.
                        diesel::update(referrals::table.find(&current.id))
                            .set((
                                referrals::click_count.eq(referrals::click_count + 1),
                                referrals::updated_at.eq(now.naive_utc()),
                            ))
                            .execute(conn)
                            .into_core()?;
                    }
                } else {
                    // Commutative increment; no status change, no re-stamp.
                    diesel::update(referrals::table.find(&current.id))
                        .set((
                            referrals::click_count.eq(referrals::click_count + 1),
                            referrals::updated_at.eq(now.naive_utc()),
                        ))
                        .execute(conn)
                        .into_core()?;
                }

                reload(conn, &current.id)
            })
            .await
    }

    async fn convert(
        &self,
        ident: ReferralIdent,
        details: ConversionDetails,
        now: DateTime<Utc>,
    ) -> Result<Conversion> {
        let reward_ttl_days = self.reward_ttl_days;
        self.writer
            .exec(move |conn| {
                let current = load_by_ident(conn, &ident)?;
                let from = ReferralStatus::parse(&current.status)?;
                if !from.can_transition_to(ReferralStatus::Converted) {
                    return Err(Error::Referral(ReferralError::InvalidTransition {
                        from,
                        to: ReferralStatus::Converted,
                    }));
                }

                let campaign: Campaign = campaigns::table
                    .select(CampaignDB::as_select())
                    .find(&current.campaign_id)
                    .first::<CampaignDB>(conn)
                    .into_core()?
                    .into();

                // Find-or-create the customer record behind the referee email
                let existing_customer = users::table
                    .select(UserDB::as_select())
                    .filter(users::email.eq(&details.email))
                    .first::<UserDB>(conn)
                    .optional()
                    .into_core()?;
                let customer_user_id = match existing_customer {
                    Some(user) => user.id,
                    None => {
                        let customer_db = UserDB::from_new_customer(
                            NewCustomer {
                                email: details.email.clone(),
                                name: details.name.clone(),
                                business_id: current.business_id.clone(),
                                referred_by: Some(current.referrer_id.clone()),
                            },
                            now.naive_utc(),
                        );
                        diesel::insert_into(users::table)
                            .values(&customer_db)
                            .execute(conn)
                            .into_core()?;
                        customer_db.id
                    }
                };

                // One pending reward per payable side, terms copied from the
                // campaign at this moment
                let reward_expires_at = Some(now + Duration::days(reward_ttl_days));
                let mut rewards: Vec<Reward> = Vec::with_capacity(2);
                let mut referrer_reward_id: Option<String> = None;
                let mut customer_reward_id: Option<String> = None;

                if campaign.referrer_reward.is_payable() {
                    let reward_db = insert_new_reward_in_tx(
                        conn,
                        NewReward {
                            user_id: current.referrer_id.clone(),
                            campaign_id: campaign.id.clone(),
                            business_id: campaign.business_id.clone(),
                            kind: campaign.referrer_reward.kind,
                            amount: campaign.referrer_reward.amount,
                            description: format!(
                                "Referral reward for campaign '{}'",
                                campaign.name
                            ),
                            expires_at: reward_expires_at,
                        },
                        now,
                    )?;
                    referrer_reward_id = Some(reward_db.id.clone());
                    rewards.push(reward_db.into());
                }
                if campaign.customer_reward.is_payable() {
                    let reward_db = insert_new_reward_in_tx(
                        conn,
                        NewReward {
                            user_id: customer_user_id.clone(),
                            campaign_id: campaign.id.clone(),
                            business_id: campaign.business_id.clone(),
                            kind: campaign.customer_reward.kind,
                            amount: campaign.customer_reward.amount,
                            description: format!(
                                "Welcome reward for campaign '{}'",
                                campaign.name
                            ),
                            expires_at: reward_expires_at,
                        },
                        now,
                    )?;
                    customer_reward_id = Some(reward_db.id.clone());
                    rewards.push(reward_db.into());
                }

                // Guarded transition; everything above rolls back with it
                // if the row slipped out of the open statuses.
                let updated = diesel::update(
                    referrals::table
                        .find(&current.id)
                        .filter(referrals::status.eq_any(OPEN_STATUSES)),
                )
                .set((
                    referrals::status.eq(ReferralStatus::Converted.as_str()),
                    referrals::converted_at.eq(Some(now.naive_utc())),
                    referrals::referee_name.eq(Some(details.name.clone())),
                    referrals::referee_email.eq(Some(details.email.clone())),
                    referrals::referee_phone.eq(details.phone.clone()),
                    referrals::notes.eq(details.notes.clone()),
                    referrals::purchase_amount
                        .eq(details.purchase_amount.map(|amount| amount.to_string())),
                    referrals::transaction_id.eq(details.transaction_id.clone()),
                    referrals::customer_id.eq(Some(customer_user_id)),
                    referrals::referrer_reward_id.eq(referrer_reward_id),
                    referrals::customer_reward_id.eq(customer_reward_id),
                    referrals::updated_at.eq(now.naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                if updated == 0 {
                    return Err(Error::Referral(ReferralError::InvalidTransition {
                        from,
                        to: ReferralStatus::Converted,
                    }));
                }

                diesel::update(campaigns::table.find(&campaign.id))
                    .set(campaigns::conversion_count.eq(campaigns::conversion_count + 1))
                    .execute(conn)
                    .into_core()?;

                Ok(Conversion {
                    referral: reload(conn, &current.id)?,
                    rewards,
                })
            })
            .await
    }

    async fn expire(&self, referral_id: &str, now: DateTime<Utc>) -> Result<Referral> {
        let referral_id_owned = referral_id.to_string();
        self.writer
            .exec(move |conn| {
                close_referral(conn, &referral_id_owned, ReferralStatus::Expired, None, now)
            })
            .await
    }

    async fn reject(
        &self,
        referral_id: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Referral> {
        let referral_id_owned = referral_id.to_string();
        let reason_owned = reason.to_string();
        self.writer
            .exec(move |conn| {
                close_referral(
                    conn,
                    &referral_id_owned,
                    ReferralStatus::Rejected,
                    Some(&reason_owned),
                    now,
                )
            })
            .await
    }

    async fn expire_due(&self, now: DateTime<Utc>) -> Result<usize> {
        self.writer
            .exec(move |conn| {
                let expired = diesel::update(
                    referrals::table
                        .filter(referrals::status.eq_any(OPEN_STATUSES))
                        .filter(referrals::expires_at.le(now.naive_utc())),
                )
                .set((
                    referrals::status.eq(ReferralStatus::Expired.as_str()),
                    referrals::updated_at.eq(now.naive_utc()),
                ))
                .execute(conn)
                .into_core()?;
                Ok(expired)
            })
            .await
    }

    fn get_by_id(&self, referral_id: &str) -> Result<Referral> {
        let mut conn = get_connection(&self.pool)?;
        let row = referrals::table
            .select(ReferralDB::as_select())
            .find(referral_id)
            .first::<ReferralDB>(&mut conn)
            .into_core()?;
        Ok(row.into())
    }

    fn get_by_code(&self, code: &str) -> Result<Referral> {
        let mut conn = get_connection(&self.pool)?;
        let row = referrals::table
            .select(ReferralDB::as_select())
            .filter(referrals::referral_code.eq(code))
            .first::<ReferralDB>(&mut conn)
            .into_core()?;
        Ok(row.into())
    }

    fn find_open_for_referrer(
        &self,
        campaign_id: &str,
        referrer_id: &str,
    ) -> Result<Option<Referral>> {
        let mut conn = get_connection(&self.pool)?;
        let row = referrals::table
            .select(ReferralDB::as_select())
            .filter(referrals::campaign_id.eq(campaign_id))
            .filter(referrals::referrer_id.eq(referrer_id))
            .filter(referrals::status.eq_any(OPEN_STATUSES))
            .order(referrals::created_at.desc())
            .first::<ReferralDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(Referral::from))
    }

    fn list_by_business(&self, business_id: &str) -> Result<Vec<Referral>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = referrals::table
            .select(ReferralDB::as_select())
            .filter(referrals::business_id.eq(business_id))
            .order(referrals::created_at.desc())
            .load::<ReferralDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Referral::from).collect())
    }

    fn list_by_referrer(&self, referrer_id: &str) -> Result<Vec<Referral>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = referrals::table
            .select(ReferralDB::as_select())
            .filter(referrals::referrer_id.eq(referrer_id))
            .order(referrals::created_at.desc())
            .load::<ReferralDB>(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Referral::from).collect())
    }
}
