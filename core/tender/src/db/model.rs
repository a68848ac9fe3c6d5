mod bid;
mod feedback;
mod identity;
mod tender;

pub use bid::{Bid, BidChanges, BidSnapshot};
pub use feedback::BidFeedback;
pub use identity::Employee;
pub use tender::{Tender, TenderChanges, TenderSnapshot};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

pub(crate) fn utc(timestamp: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&timestamp)
}
