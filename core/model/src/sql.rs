use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql};
use diesel::serialize::{self, Output, ToSql};
use diesel::sql_types::Text;
use std::io::Write;

use crate::{AuthorType, BidDecision, BidStatus, ServiceType, TenderStatus};

/// Stores enums as their variant names, so the database stays readable and
/// `CHECK` constraints can list the allowed values.
macro_rules! text_column {
    ($($ty:ident),* $(,)?) => {$(
        impl<DB: Backend> ToSql<Text, DB> for $ty
        where
            str: ToSql<Text, DB>,
        {
            fn to_sql<W: Write>(&self, out: &mut Output<W, DB>) -> serialize::Result {
                <str as ToSql<Text, DB>>::to_sql(self.as_ref(), out)
            }
        }

        impl<DB: Backend> FromSql<Text, DB> for $ty
        where
            String: FromSql<Text, DB>,
        {
            fn from_sql(bytes: Option<&DB::RawValue>) -> deserialize::Result<Self> {
                let value = <String as FromSql<Text, DB>>::from_sql(bytes)?;
                value
                    .parse()
                    .map_err(|_| format!("Unknown {} value: {}", stringify!($ty), value).into())
            }
        }
    )*};
}

text_column!(TenderStatus, ServiceType, BidStatus, BidDecision, AuthorType);
