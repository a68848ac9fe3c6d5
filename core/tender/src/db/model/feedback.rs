use chrono::NaiveDateTime;

use tf_model::{BidId, BidReview};

use crate::db::model::utc;

#[derive(Clone, Debug, Queryable)]
pub struct BidFeedback {
    pub id: String,
    pub bid_id: BidId,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl BidFeedback {
    pub fn into_client(self) -> BidReview {
        BidReview {
            id: self.id,
            description: self.description,
            created_at: utc(self.created_at),
        }
    }
}
