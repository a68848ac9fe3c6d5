use chrono::NaiveDateTime;

use tf_model::{
    AuthorType, Bid as ClientBid, BidEdit, BidId, BidStatus, OrganizationId, TenderId, UserId,
};

use crate::db::model::utc;
use crate::db::schema::bid;

#[derive(Clone, Debug, Identifiable, Queryable)]
#[table_name = "bid"]
pub struct Bid {
    pub id: BidId,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: TenderId,
    pub author_type: AuthorType,
    pub author_id: UserId,
    /// Organization the author was responsible for when the bid was placed.
    pub organization_id: OrganizationId,
    pub version: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Queryable)]
pub struct BidSnapshot {
    pub bid_id: BidId,
    pub version: i32,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    pub tender_id: TenderId,
    pub author_type: AuthorType,
    pub author_id: UserId,
    pub organization_id: OrganizationId,
    pub created_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[table_name = "bid"]
pub struct BidChanges<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl<'a> From<&'a BidEdit> for BidChanges<'a> {
    fn from(edit: &'a BidEdit) -> Self {
        BidChanges {
            name: edit.name.as_deref(),
            description: edit.description.as_deref(),
        }
    }
}

impl<'a> From<&'a BidSnapshot> for BidChanges<'a> {
    fn from(snapshot: &'a BidSnapshot) -> Self {
        BidChanges {
            name: Some(&snapshot.name),
            description: Some(&snapshot.description),
        }
    }
}

impl Bid {
    pub fn into_client(self) -> ClientBid {
        ClientBid {
            id: self.id,
            name: self.name,
            description: self.description,
            status: self.status,
            tender_id: self.tender_id,
            author_type: self.author_type,
            author_id: self.author_id,
            version: self.version,
            created_at: utc(self.created_at),
        }
    }
}
