use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{BidId, TenderId, UserId};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "with-diesel",
    derive(AsExpression, FromSqlRow),
    sql_type = "diesel::sql_types::Text"
)]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
    Approved,
    Rejected,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "with-diesel",
    derive(AsExpression, FromSqlRow),
    sql_type = "diesel::sql_types::Text"
)]
pub enum BidDecision {
    Approved,
    Rejected,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "with-diesel",
    derive(AsExpression, FromSqlRow),
    sql_type = "diesel::sql_types::Text"
)]
pub enum AuthorType {
    Organization,
    User,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: BidId,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: TenderId,
    pub author_type: AuthorType,
    pub author_id: UserId,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBid {
    pub name: String,
    pub description: String,
    pub tender_id: TenderId,
    pub author_type: AuthorType,
    pub author_id: UserId,
}

/// Partial update of a bid's content. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidEdit {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl BidEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidReview {
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
