pub(crate) mod dao;
pub(crate) mod error;
pub(crate) mod model;
pub(crate) mod schema;

#[allow(dead_code)]
pub(crate) mod migrations {
    #[derive(diesel_migrations::EmbedMigrations)]
    struct _Dummy;
}

pub use error::{EntityKind, StoreError};
pub(crate) use tf_persistence::DbError;

pub(crate) type StoreResult<T> = Result<T, StoreError>;
