use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use tf_persistence::{do_with_transaction, readonly_transaction, AsDao, PoolType, SqlTimestamp};

use crate::db::model::BidFeedback;
use crate::db::schema::bid::dsl as bid;
use crate::db::schema::bid_feedback::dsl;
use crate::db::StoreResult;

pub struct FeedbackDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for FeedbackDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> FeedbackDao<'c> {
    pub async fn create(&self, bid_id: &str, description: &str) -> StoreResult<()> {
        let id = Uuid::new_v4().to_string();
        let bid_id = bid_id.to_string();
        let description = description.to_string();
        do_with_transaction(self.pool, "feedback_create", move |conn| {
            diesel::insert_into(dsl::bid_feedback)
                .values((
                    dsl::id.eq(&id),
                    dsl::bid_id.eq(&bid_id),
                    dsl::description.eq(&description),
                    dsl::created_at.eq(SqlTimestamp::now()),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await
    }

    /// Feedback left on the author's bids for one tender, oldest first.
    pub async fn list_for_author(
        &self,
        tender_id: &str,
        author_id: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<BidFeedback>> {
        let tender_id = tender_id.to_string();
        let author_id = author_id.to_string();
        readonly_transaction(self.pool, "feedback_list_for_author", move |conn| {
            Ok(dsl::bid_feedback
                .inner_join(bid::bid)
                .filter(bid::tender_id.eq(&tender_id))
                .filter(bid::author_id.eq(&author_id))
                .select((dsl::id, dsl::bid_id, dsl::description, dsl::created_at))
                .order((dsl::created_at.asc(), dsl::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<BidFeedback>(conn)?)
        })
        .await
    }
}
