use std::fmt::Display;

use tf_model::{BidStatus, TenderStatus};

use crate::db::{EntityKind, StoreError};

/// Lifecycle state machine of an entity's status.
pub trait Lifecycle: Copy + PartialEq + Display {
    const KIND: EntityKind;

    /// Whether `self -> to` is an edge of the state machine. Staying in the
    /// same state is not an edge.
    fn can_become(self, to: Self) -> bool;
    fn is_terminal(self) -> bool;
}

impl Lifecycle for TenderStatus {
    const KIND: EntityKind = EntityKind::Tender;

    fn can_become(self, to: Self) -> bool {
        use TenderStatus::*;
        matches!((self, to), (Created, Published) | (Published, Closed))
    }

    fn is_terminal(self) -> bool {
        self == TenderStatus::Closed
    }
}

impl Lifecycle for BidStatus {
    const KIND: EntityKind = EntityKind::Bid;

    fn can_become(self, to: Self) -> bool {
        use BidStatus::*;
        matches!(
            (self, to),
            (Created, Published)
                | (Created, Canceled)
                | (Published, Canceled)
                | (Created, Approved)
                | (Published, Approved)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(
            self,
            BidStatus::Canceled | BidStatus::Approved | BidStatus::Rejected
        )
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Can't change {kind} [{id}] status from {from} to {to}.")]
pub struct InvalidTransition {
    pub kind: EntityKind,
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Returns whether the status actually changes; setting the current status
/// again is accepted as a no-op.
pub fn check_transition<S: Lifecycle>(id: &str, from: S, to: S) -> Result<bool, InvalidTransition> {
    if from == to {
        return Ok(false);
    }
    match from.can_become(to) {
        true => Ok(true),
        false => Err(InvalidTransition {
            kind: S::KIND,
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }),
    }
}

/// Statuses a bid's author may set directly, bypassing reviewers.
pub fn author_may_set(status: BidStatus) -> bool {
    matches!(
        status,
        BidStatus::Created | BidStatus::Published | BidStatus::Canceled
    )
}

#[derive(thiserror::Error, Debug)]
pub enum StatusError {
    #[error(transparent)]
    Transition(InvalidTransition),
    #[error(transparent)]
    Store(StoreError),
}

impl<E: Into<StoreError>> From<E> for StatusError {
    fn from(e: E) -> Self {
        StatusError::Store(e.into())
    }
}
