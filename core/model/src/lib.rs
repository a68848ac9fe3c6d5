//! Types shared by the tender service and its clients.

#[cfg(feature = "with-diesel")]
#[macro_use]
extern crate diesel;

pub mod bid;
pub mod error;
#[cfg(feature = "with-diesel")]
mod sql;
pub mod tender;

pub use bid::{AuthorType, Bid, BidDecision, BidEdit, BidReview, BidStatus, NewBid};
pub use error::ErrorMessage;
pub use tender::{NewTender, ServiceType, Tender, TenderEdit, TenderStatus};

pub type TenderId = String;
pub type BidId = String;
pub type UserId = String;
pub type OrganizationId = String;
