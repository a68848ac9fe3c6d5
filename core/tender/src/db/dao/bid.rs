use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use tf_model::{BidEdit, BidStatus, NewBid, TenderId, TenderStatus};
use tf_persistence::{
    do_with_transaction, readonly_transaction, AsDao, ConnType, PoolType, SqlTimestamp,
};

use crate::db::dao::tender::get_tender;
use crate::db::model::{Bid, BidChanges, BidSnapshot};
use crate::db::schema::bid::dsl;
use crate::db::schema::bid_version::dsl as history;
use crate::db::{EntityKind, StoreError, StoreResult};
use crate::versioning::{
    apply_edit, apply_rollback, FieldMask, MutationError, Versioned, VersionedEntityStore,
};
use crate::workflow::transition::{check_transition, Lifecycle, StatusError};

#[derive(thiserror::Error, Debug)]
pub enum CreateBidError {
    #[error("Tender [{0}] isn't published.")]
    TenderNotPublished(TenderId),
    #[error("Organization [{organization_id}] already placed a bid on Tender [{tender_id}].")]
    AlreadyPlaced {
        tender_id: TenderId,
        organization_id: String,
    },
    #[error(transparent)]
    Store(StoreError),
}

impl<E: Into<StoreError>> From<E> for CreateBidError {
    fn from(e: E) -> Self {
        CreateBidError::Store(e.into())
    }
}

pub struct BidDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for BidDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> BidDao<'c> {
    /// Places a bid of `organization_id` on a published tender. One bid per
    /// organization and tender, whatever state the tender is in now.
    pub async fn create(&self, bid: NewBid, organization_id: &str) -> Result<Bid, CreateBidError> {
        let id = Uuid::new_v4().to_string();
        let organization_id = organization_id.to_string();
        do_with_transaction(self.pool, "bid_create", move |conn| {
            let tender = get_tender(conn, &bid.tender_id)?;
            let placed = dsl::bid
                .filter(dsl::tender_id.eq(&tender.id))
                .filter(dsl::organization_id.eq(&organization_id))
                .select(dsl::id)
                .first::<String>(conn)
                .optional()?;
            if placed.is_some() {
                return Err(CreateBidError::AlreadyPlaced {
                    tender_id: tender.id,
                    organization_id,
                });
            }
            if tender.status != TenderStatus::Published {
                return Err(CreateBidError::TenderNotPublished(tender.id));
            }

            diesel::insert_into(dsl::bid)
                .values((
                    dsl::id.eq(&id),
                    dsl::name.eq(&bid.name),
                    dsl::description.eq(&bid.description),
                    dsl::status.eq(BidStatus::Created),
                    dsl::tender_id.eq(&bid.tender_id),
                    dsl::author_type.eq(bid.author_type),
                    dsl::author_id.eq(&bid.author_id),
                    dsl::organization_id.eq(&organization_id),
                    dsl::version.eq(1),
                    dsl::created_at.eq(SqlTimestamp::now()),
                ))
                .execute(conn)?;
            Ok(get_bid(conn, &id)?)
        })
        .await
    }

    pub async fn get(&self, id: &str) -> StoreResult<Bid> {
        let id = id.to_string();
        readonly_transaction(self.pool, "bid_get", move |conn| get_bid(conn, &id)).await
    }

    pub async fn list_by_author(
        &self,
        author_id: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Bid>> {
        let author_id = author_id.to_string();
        readonly_transaction(self.pool, "bid_list_by_author", move |conn| {
            Ok(dsl::bid
                .filter(dsl::author_id.eq(&author_id))
                .order((dsl::name.asc(), dsl::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<Bid>(conn)?)
        })
        .await
    }

    /// Bids of a tender visible to its reviewers, i.e. no longer `Created`.
    pub async fn list_for_tender(
        &self,
        tender_id: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Bid>> {
        let tender_id = tender_id.to_string();
        readonly_transaction(self.pool, "bid_list_for_tender", move |conn| {
            Ok(dsl::bid
                .filter(dsl::tender_id.eq(&tender_id))
                .filter(dsl::status.ne(BidStatus::Created))
                .order((dsl::name.asc(), dsl::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<Bid>(conn)?)
        })
        .await
    }

    pub async fn set_status(&self, id: &str, status: BidStatus) -> Result<Bid, StatusError> {
        let id = id.to_string();
        do_with_transaction(self.pool, "bid_set_status", move |conn| {
            let bid = get_bid(conn, &id)?;
            if !check_transition(&id, bid.status, status).map_err(StatusError::Transition)? {
                return Ok(bid);
            }
            log::info!("Bid [{}] status change: {} -> {}.", id, bid.status, status);
            Ok(update_status(conn, &bid, status)?)
        })
        .await
    }

    pub async fn edit(&self, id: &str, edit: BidEdit) -> Result<Bid, MutationError> {
        let id = id.to_string();
        do_with_transaction(self.pool, "bid_edit", move |conn| {
            apply_edit(&BidStore::new(conn), &id, &edit)
        })
        .await
    }

    pub async fn rollback(&self, id: &str, version: i32) -> Result<Bid, MutationError> {
        let id = id.to_string();
        do_with_transaction(self.pool, "bid_rollback", move |conn| {
            apply_rollback(&BidStore::new(conn), &id, version)
        })
        .await
    }

    pub async fn history(&self, id: &str) -> StoreResult<Vec<BidSnapshot>> {
        let id = id.to_string();
        readonly_transaction(self.pool, "bid_history", move |conn| {
            Ok(history::bid_version
                .filter(history::bid_id.eq(&id))
                .order(history::version.asc())
                .load::<BidSnapshot>(conn)?)
        })
        .await
    }
}

pub(crate) fn get_bid(conn: &ConnType, id: &str) -> StoreResult<Bid> {
    dsl::bid
        .find(id)
        .first::<Bid>(conn)
        .optional()?
        .ok_or_else(|| StoreError::NotFound(EntityKind::Bid, id.to_string()))
}

pub(crate) fn update_status(conn: &ConnType, bid: &Bid, status: BidStatus) -> StoreResult<Bid> {
    diesel::update(dsl::bid.find(&bid.id))
        .set(dsl::status.eq(status))
        .execute(conn)?;
    get_bid(conn, &bid.id)
}

impl Versioned for Bid {
    const KIND: EntityKind = EntityKind::Bid;

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn state(&self) -> String {
        self.status.to_string()
    }

    fn accepts_changes(&self) -> bool {
        !self.status.is_terminal()
    }
}

impl FieldMask for BidEdit {
    fn is_empty(&self) -> bool {
        BidEdit::is_empty(self)
    }
}

pub struct BidStore<'c> {
    conn: &'c ConnType,
}

impl<'c> BidStore<'c> {
    pub fn new(conn: &'c ConnType) -> Self {
        BidStore { conn }
    }

    fn write(&self, current: &Bid, changes: BidChanges) -> StoreResult<Bid> {
        let num_updated = diesel::update(
            dsl::bid
                .filter(dsl::id.eq(&current.id))
                .filter(dsl::version.eq(current.version)),
        )
        .set((&changes, dsl::version.eq(dsl::version + 1)))
        .execute(self.conn)?;

        if num_updated == 0 {
            return Err(StoreError::VersionMismatch(
                EntityKind::Bid,
                current.id.clone(),
                current.version,
            ));
        }
        get_bid(self.conn, &current.id)
    }
}

impl<'c> VersionedEntityStore for BidStore<'c> {
    type Entity = Bid;
    type Snapshot = BidSnapshot;
    type Patch = BidEdit;

    fn snapshot(&self, id: &str) -> StoreResult<Bid> {
        let current = get_bid(self.conn, id)?;
        diesel::insert_into(history::bid_version)
            .values((
                history::bid_id.eq(&current.id),
                history::version.eq(current.version),
                history::name.eq(&current.name),
                history::description.eq(&current.description),
                history::status.eq(current.status),
                history::tender_id.eq(&current.tender_id),
                history::author_type.eq(current.author_type),
                history::author_id.eq(&current.author_id),
                history::organization_id.eq(&current.organization_id),
                history::created_at.eq(SqlTimestamp::from(current.created_at)),
            ))
            .execute(self.conn)?;
        Ok(current)
    }

    fn fetch(&self, id: &str, version: i32) -> StoreResult<BidSnapshot> {
        history::bid_version
            .find((id, version))
            .first::<BidSnapshot>(self.conn)
            .optional()?
            .ok_or_else(|| StoreError::SnapshotNotFound(EntityKind::Bid, id.to_string(), version))
    }

    fn update(&self, current: &Bid, edit: &BidEdit) -> StoreResult<Bid> {
        self.write(current, BidChanges::from(edit))
    }

    fn restore(&self, current: &Bid, snapshot: &BidSnapshot) -> StoreResult<Bid> {
        self.write(current, BidChanges::from(snapshot))
    }
}
