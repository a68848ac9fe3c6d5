use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl};
use uuid::Uuid;

use tf_model::{NewTender, ServiceType, TenderEdit, TenderStatus};
use tf_persistence::{
    do_with_transaction, readonly_transaction, AsDao, ConnType, PoolType, SqlTimestamp,
};

use crate::db::model::{Tender, TenderChanges, TenderSnapshot};
use crate::db::schema::tender::dsl;
use crate::db::schema::tender_version::dsl as history;
use crate::db::{EntityKind, StoreError, StoreResult};
use crate::versioning::{
    apply_edit, apply_rollback, FieldMask, MutationError, Versioned, VersionedEntityStore,
};
use crate::workflow::transition::{check_transition, StatusError};

pub struct TenderDao<'c> {
    pool: &'c PoolType,
}

impl<'c> AsDao<'c> for TenderDao<'c> {
    fn as_dao(pool: &'c PoolType) -> Self {
        Self { pool }
    }
}

impl<'c> TenderDao<'c> {
    pub async fn create(&self, tender: NewTender) -> StoreResult<Tender> {
        let id = Uuid::new_v4().to_string();
        do_with_transaction(self.pool, "tender_create", move |conn| {
            diesel::insert_into(dsl::tender)
                .values((
                    dsl::id.eq(&id),
                    dsl::name.eq(&tender.name),
                    dsl::description.eq(&tender.description),
                    dsl::service_type.eq(tender.service_type),
                    dsl::status.eq(TenderStatus::Created),
                    dsl::organization_id.eq(&tender.organization_id),
                    dsl::version.eq(1),
                    dsl::created_at.eq(SqlTimestamp::now()),
                    dsl::creator_username.eq(&tender.creator_username),
                ))
                .execute(conn)?;
            get_tender(conn, &id)
        })
        .await
    }

    pub async fn get(&self, id: &str) -> StoreResult<Tender> {
        let id = id.to_string();
        readonly_transaction(self.pool, "tender_get", move |conn| get_tender(conn, &id)).await
    }

    /// Published tenders ordered by name, optionally restricted to some
    /// service types.
    pub async fn list_published(
        &self,
        service_types: Vec<ServiceType>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Tender>> {
        readonly_transaction(self.pool, "tender_list_published", move |conn| {
            let mut query = dsl::tender
                .filter(dsl::status.eq(TenderStatus::Published))
                .into_boxed();
            if !service_types.is_empty() {
                query = query.filter(dsl::service_type.eq_any(service_types));
            }
            Ok(query
                .order((dsl::name.asc(), dsl::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<Tender>(conn)?)
        })
        .await
    }

    pub async fn list_by_creator(
        &self,
        username: &str,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Tender>> {
        let username = username.to_string();
        readonly_transaction(self.pool, "tender_list_by_creator", move |conn| {
            Ok(dsl::tender
                .filter(dsl::creator_username.eq(&username))
                .order((dsl::name.asc(), dsl::id.asc()))
                .limit(limit)
                .offset(offset)
                .load::<Tender>(conn)?)
        })
        .await
    }

    /// Status is lifecycle state, so changing it doesn't create a version.
    pub async fn set_status(&self, id: &str, status: TenderStatus) -> Result<Tender, StatusError> {
        let id = id.to_string();
        do_with_transaction(self.pool, "tender_set_status", move |conn| {
            let tender = get_tender(conn, &id)?;
            if !check_transition(&id, tender.status, status).map_err(StatusError::Transition)? {
                return Ok(tender);
            }
            log::info!(
                "Tender [{}] status change: {} -> {}.",
                id,
                tender.status,
                status
            );
            Ok(update_status(conn, &tender, status)?)
        })
        .await
    }

    pub async fn edit(&self, id: &str, edit: TenderEdit) -> Result<Tender, MutationError> {
        let id = id.to_string();
        do_with_transaction(self.pool, "tender_edit", move |conn| {
            apply_edit(&TenderStore::new(conn), &id, &edit)
        })
        .await
    }

    pub async fn rollback(&self, id: &str, version: i32) -> Result<Tender, MutationError> {
        let id = id.to_string();
        do_with_transaction(self.pool, "tender_rollback", move |conn| {
            apply_rollback(&TenderStore::new(conn), &id, version)
        })
        .await
    }

    pub async fn history(&self, id: &str) -> StoreResult<Vec<TenderSnapshot>> {
        let id = id.to_string();
        readonly_transaction(self.pool, "tender_history", move |conn| {
            Ok(history::tender_version
                .filter(history::tender_id.eq(&id))
                .order(history::version.asc())
                .load::<TenderSnapshot>(conn)?)
        })
        .await
    }
}

pub(crate) fn get_tender(conn: &ConnType, id: &str) -> StoreResult<Tender> {
    dsl::tender
        .find(id)
        .first::<Tender>(conn)
        .optional()?
        .ok_or_else(|| StoreError::NotFound(EntityKind::Tender, id.to_string()))
}

pub(crate) fn update_status(
    conn: &ConnType,
    tender: &Tender,
    status: TenderStatus,
) -> StoreResult<Tender> {
    diesel::update(dsl::tender.find(&tender.id))
        .set(dsl::status.eq(status))
        .execute(conn)?;
    get_tender(conn, &tender.id)
}

impl Versioned for Tender {
    const KIND: EntityKind = EntityKind::Tender;

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
        self.status != TenderStatus::Closed
    }
}

impl FieldMask for TenderEdit {
    fn is_empty(&self) -> bool {
        TenderEdit::is_empty(self)
    }
}

/// `VersionedEntityStore` of tenders, bound to an open transaction.
pub struct TenderStore<'c> {
    conn: &'c ConnType,
}

impl<'c> TenderStore<'c> {
    pub fn new(conn: &'c ConnType) -> Self {
        TenderStore { conn }
    }

    fn write(&self, current: &Tender, changes: TenderChanges) -> StoreResult<Tender> {
        let num_updated = diesel::update(
            dsl::tender
                .filter(dsl::id.eq(&current.id))
                .filter(dsl::version.eq(current.version)),
        )
        .set((&changes, dsl::version.eq(dsl::version + 1)))
        .execute(self.conn)?;

        if num_updated == 0 {
            return Err(StoreError::VersionMismatch(
                EntityKind::Tender,
                current.id.clone(),
                current.version,
            ));
        }
        get_tender(self.conn, &current.id)
    }
}

impl<'c> VersionedEntityStore for TenderStore<'c> {
    type Entity = Tender;
    type Snapshot = TenderSnapshot;
    type Patch = TenderEdit;

    fn snapshot(&self, id: &str) -> StoreResult<Tender> {
        let current = get_tender(self.conn, id)?;
        diesel::insert_into(history::tender_version)
            .values((
                history::tender_id.eq(&current.id),
                history::version.eq(current.version),
                history::name.eq(&current.name),
                history::description.eq(&current.description),
                history::service_type.eq(current.service_type),
                history::status.eq(current.status),
                history::organization_id.eq(&current.organization_id),
                history::created_at.eq(SqlTimestamp::from(current.created_at)),
                history::creator_username.eq(&current.creator_username),
            ))
            .execute(self.conn)?;
        Ok(current)
    }

    fn fetch(&self, id: &str, version: i32) -> StoreResult<TenderSnapshot> {
        history::tender_version
            .find((id, version))
            .first::<TenderSnapshot>(self.conn)
            .optional()?
            .ok_or_else(|| StoreError::SnapshotNotFound(EntityKind::Tender, id.to_string(), version))
    }

    fn update(&self, current: &Tender, edit: &TenderEdit) -> StoreResult<Tender> {
        self.write(current, TenderChanges::from(edit))
    }

    fn restore(&self, current: &Tender, snapshot: &TenderSnapshot) -> StoreResult<Tender> {
        self.write(current, TenderChanges::from(snapshot))
    }
}
