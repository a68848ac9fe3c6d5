use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::backend::Backend;
use diesel::deserialize::FromSql;
use diesel::serialize::{Output, ToSql};
use diesel::sql_types::{Text, Timestamp};
use diesel::sqlite::Sqlite;
use diesel::{deserialize, serialize};
use std::io::Write;

const STORAGE_FORMAT: &str = "%F %T.%6f";

/// Timestamp written with a fixed-width fractional part.
///
/// SQLite compares timestamps as text and the default chrono formatting drops
/// a zero sub-second part, so `12:33:14` would sort after `12:33:14.000001`.
/// Every `created_at` column is written through this type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, AsExpression)]
#[sql_type = "Timestamp"]
pub struct SqlTimestamp(pub NaiveDateTime);

impl SqlTimestamp {
    pub fn now() -> Self {
        SqlTimestamp(Utc::now().naive_utc())
    }

    pub fn to_storage_string(&self) -> String {
        self.0.format(STORAGE_FORMAT).to_string()
    }
}

impl From<NaiveDateTime> for SqlTimestamp {
    fn from(value: NaiveDateTime) -> Self {
        SqlTimestamp(value)
    }
}

impl From<DateTime<Utc>> for SqlTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        SqlTimestamp(value.naive_utc())
    }
}

impl FromSql<Timestamp, Sqlite> for SqlTimestamp {
    fn from_sql(value: Option<&<Sqlite as Backend>::RawValue>) -> deserialize::Result<Self> {
        <NaiveDateTime as FromSql<Timestamp, Sqlite>>::from_sql(value).map(SqlTimestamp)
    }
}

impl ToSql<Timestamp, Sqlite> for SqlTimestamp {
    fn to_sql<W: Write>(&self, out: &mut Output<W, Sqlite>) -> serialize::Result {
        ToSql::<Text, Sqlite>::to_sql(&self.to_storage_string(), out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    #[test_case(0, "2024-03-01 09:15:00.000000"; "whole second")]
    #[test_case(1_000, "2024-03-01 09:15:00.000001"; "one microsecond")]
    #[test_case(123_456_789, "2024-03-01 09:15:00.123456"; "nanoseconds truncated")]
    fn test_storage_format(nanos: u32, expected: &str) {
        let timestamp = NaiveDate::from_ymd(2024, 3, 1).and_hms_nano(9, 15, 0, nanos);
        assert_eq!(SqlTimestamp(timestamp).to_storage_string(), expected);
    }

    #[test]
    fn test_storage_strings_sort_like_timestamps() {
        let earlier = NaiveDate::from_ymd(2024, 3, 1).and_hms(9, 15, 0);
        let later = NaiveDate::from_ymd(2024, 3, 1).and_hms_micro(9, 15, 0, 1);

        assert!(
            SqlTimestamp(earlier).to_storage_string() < SqlTimestamp(later).to_storage_string()
        );
    }
}
