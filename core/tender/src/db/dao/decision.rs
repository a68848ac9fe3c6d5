use diesel::dsl::{count_star, exists};
use diesel::{select, ExpressionMethods, QueryDsl, RunQueryDsl};

use tf_model::{BidDecision, BidStatus, TenderStatus};
use tf_persistence::{
    do_with_transaction, readonly_transaction, AsDao, ConnType, PoolType, SqlTimestamp,
};

use crate::db::dao::{bid, tender};
use crate::db::model::{Bid, Tender};
use crate::db::schema::bid_decision::dsl;
use crate::db::schema::organization_responsible::dsl as responsible;
use crate::db::{StoreError, StoreResult};
use crate::workflow::decision::{submit_decision, DecisionError, DecisionStore};

pub struct DecisionDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for DecisionDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> DecisionDao<'c> {
    /// Records the decision and applies its outcome in a single transaction.
    pub async fn submit(
        &self,
        bid_id: &str,
        user_id: &str,
        decision: BidDecision,
        quorum_cap: u32,
    ) -> Result<Bid, DecisionError> {
        let bid_id = bid_id.to_string();
        let user_id = user_id.to_string();
        do_with_transaction(self.pool, "decision_submit", move |conn| {
            submit_decision(
                &SqlDecisionStore::new(conn),
                &bid_id,
                &user_id,
                decision,
                quorum_cap,
            )
        })
        .await
    }

    pub async fn list(&self, bid_id: &str) -> StoreResult<Vec<(String, BidDecision)>> {
        let bid_id = bid_id.to_string();
        readonly_transaction(self.pool, "decision_list", move |conn| {
            Ok(dsl::bid_decision
                .filter(dsl::bid_id.eq(&bid_id))
                .select((dsl::user_id, dsl::decision))
                .order(dsl::created_at.asc())
                .load::<(String, BidDecision)>(conn)?)
        })
        .await
    }
}

pub struct SqlDecisionStore<'c> {
    conn: &'c ConnType,
}

impl<'c> SqlDecisionStore<'c> {
    pub fn new(conn: &'c ConnType) -> Self {
        SqlDecisionStore { conn }
    }
}

impl<'c> DecisionStore for SqlDecisionStore<'c> {
    fn bid(&self, bid_id: &str) -> Result<Bid, StoreError> {
        bid::get_bid(self.conn, bid_id)
    }

    fn tender(&self, tender_id: &str) -> Result<Tender, StoreError> {
        tender::get_tender(self.conn, tender_id)
    }

    fn has_decided(&self, bid_id: &str, user_id: &str) -> Result<bool, StoreError> {
        Ok(select(exists(
            dsl::bid_decision
                .filter(dsl::bid_id.eq(bid_id))
                .filter(dsl::user_id.eq(user_id)),
        ))
        .get_result::<bool>(self.conn)?)
    }

    fn record(&self, bid_id: &str, user_id: &str, decision: BidDecision) -> Result<(), StoreError> {
        diesel::insert_into(dsl::bid_decision)
            .values((
                dsl::bid_id.eq(bid_id),
                dsl::user_id.eq(user_id),
                dsl::decision.eq(decision),
                dsl::created_at.eq(SqlTimestamp::now()),
            ))
            .execute(self.conn)?;
        Ok(())
    }

    fn approvals(&self, bid_id: &str) -> Result<i64, StoreError> {
        Ok(dsl::bid_decision
            .filter(dsl::bid_id.eq(bid_id))
            .filter(dsl::decision.eq(BidDecision::Approved))
            .select(count_star())
            .first::<i64>(self.conn)?)
    }

    fn reviewers(&self, organization_id: &str) -> Result<i64, StoreError> {
        // `organization_responsible` is unique on (organization_id, user_id).
        Ok(responsible::organization_responsible
            .filter(responsible::organization_id.eq(organization_id))
            .select(count_star())
            .first::<i64>(self.conn)?)
    }

    fn set_bid_status(&self, bid: &Bid, status: BidStatus) -> Result<Bid, StoreError> {
        bid::update_status(self.conn, bid, status)
    }

    fn set_tender_status(&self, tender: &Tender, status: TenderStatus) -> Result<Tender, StoreError> {
        tender::update_status(self.conn, tender, status)
    }
}
