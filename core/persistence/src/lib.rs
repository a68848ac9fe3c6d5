#[macro_use]
extern crate diesel;

pub mod executor;
pub mod timestamp;

pub use executor::{
    do_with_transaction, readonly_transaction, AsDao, ConnType, DbExecutor, DbOptions,
    Error as DbError, InnerConnType, PoolType,
};
pub use timestamp::SqlTimestamp;
