use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::db::DbError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum EntityKind {
    Tender,
    Bid,
}

/// Failures at the storage boundary, with constraint violations already
/// classified.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{0} [{1}] not found.")]
    NotFound(EntityKind, String),
    #[error("{0} [{1}] has no version {2}.")]
    SnapshotNotFound(EntityKind, String, i32),
    #[error("{0} [{1}] was changed concurrently, expected version {2}.")]
    VersionMismatch(EntityKind, String, i32),
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
    #[error("Referenced entity doesn't exist: {0}")]
    DependencyMissing(String),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
}

impl From<DieselError> for StoreError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::Duplicate(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::DependencyMissing(info.message().to_string())
            }
            e => StoreError::Db(DbError::Query(e)),
        }
    }
}

