use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use referra_core::selections::{CampaignSelection, SelectionOutcome, SelectionRepositoryTrait};
use referra_core::Result;

use super::model::CampaignSelectionDB;
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{campaign_selections, campaigns};

/// Repository for the referrer ↔ campaign selection relation
pub struct SelectionRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl SelectionRepository {
    /// Creates a new SelectionRepository instance
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }
}

/// Select-then-insert inside one writer transaction. The unique index on
/// (campaign_id, referrer_id) backstops the idempotency; the campaign's
/// referrer_count is bumped only by the call that inserted the row.
pub(crate) fn ensure_selected_in_tx(
    conn: &mut SqliteConnection,
    campaign_id: &str,
    referrer_id: &str,
) -> Result<SelectionOutcome> {
    let existing = campaign_selections::table
        .select(CampaignSelectionDB::as_select())
        .filter(campaign_selections::campaign_id.eq(campaign_id))
        .filter(campaign_selections::referrer_id.eq(referrer_id))
        .first::<CampaignSelectionDB>(conn)
        .optional()
        .into_core()?;

    if let Some(row) = existing {
        return Ok(SelectionOutcome {
            selection: row.into(),
            newly_selected: false,
        });
    }

    let now = chrono::Utc::now().naive_utc();
    let selection_db = CampaignSelectionDB::new(campaign_id, referrer_id, now);
    diesel::insert_into(campaign_selections::table)
        .values(&selection_db)
        .execute(conn)
        .into_core()?;
    diesel::update(campaigns::table.find(campaign_id))
        .set(campaigns::referrer_count.eq(campaigns::referrer_count + 1))
        .execute(conn)
        .into_core()?;

    Ok(SelectionOutcome {
        selection: selection_db.into(),
        newly_selected: true,
    })
}

#[async_trait]
impl SelectionRepositoryTrait for SelectionRepository {
    async fn ensure_selected(
        &self,
        campaign_id: &str,
        referrer_id: &str,
    ) -> Result<SelectionOutcome> {
        let campaign_id_owned = campaign_id.to_string();
        let referrer_id_owned = referrer_id.to_string();
        self.writer
            .exec(move |conn| ensure_selected_in_tx(conn, &campaign_id_owned, &referrer_id_owned))
            .await
    }

    fn find(&self, campaign_id: &str, referrer_id: &str) -> Result<Option<CampaignSelection>> {
        let mut conn = get_connection(&self.pool)?;
        let selection = campaign_selections::table
            .select(CampaignSelectionDB::as_select())
            .filter(campaign_selections::campaign_id.eq(campaign_id))
            .filter(campaign_selections::referrer_id.eq(referrer_id))
            .first::<CampaignSelectionDB>(&mut conn)
            .optional()
            .into_core()?;
        Ok(selection.map(CampaignSelection::from))
    }
}
