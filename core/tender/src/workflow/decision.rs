//! Quorum aggregation of reviewer decisions on a bid.
//!
//! A single `Rejected` decision cancels the bid. `Approved` decisions are
//! counted against `min(cap, N)`, where `N` is the number of users responsible
//! for the tender's organization. Reaching the quorum approves the bid and
//! closes its tender.
use tf_model::{BidDecision, BidStatus, TenderStatus};

use crate::db::model::{Bid, Tender};
use crate::db::StoreError;
use crate::workflow::transition::{check_transition, InvalidTransition, Lifecycle};

/// Storage capability needed by `submit_decision`.
///
/// Implementations are bound to one transaction, so recording a decision,
/// counting approvals and the resulting status updates commit together.
pub trait DecisionStore {
    fn bid(&self, bid_id: &str) -> Result<Bid, StoreError>;
    fn tender(&self, tender_id: &str) -> Result<Tender, StoreError>;
    fn has_decided(&self, bid_id: &str, user_id: &str) -> Result<bool, StoreError>;
    fn record(&self, bid_id: &str, user_id: &str, decision: BidDecision) -> Result<(), StoreError>;
    fn approvals(&self, bid_id: &str) -> Result<i64, StoreError>;
    /// Number of distinct users responsible for the organization.
    fn reviewers(&self, organization_id: &str) -> Result<i64, StoreError>;
    fn set_bid_status(&self, bid: &Bid, status: BidStatus) -> Result<Bid, StoreError>;
    fn set_tender_status(&self, tender: &Tender, status: TenderStatus)
        -> Result<Tender, StoreError>;
}

#[derive(thiserror::Error, Debug)]
pub enum DecisionError {
    #[error("User [{user_id}] already submitted a decision on Bid [{bid_id}].")]
    AlreadyDecided { bid_id: String, user_id: String },
    #[error("Bid [{0}] is {1} and no longer accepts decisions.")]
    BidFinished(String, BidStatus),
    #[error("Tender [{0}] is closed.")]
    TenderClosed(String),
    #[error(transparent)]
    Transition(InvalidTransition),
    #[error(transparent)]
    Store(StoreError),
}

impl<E: Into<StoreError>> From<E> for DecisionError {
    fn from(e: E) -> Self {
        DecisionError::Store(e.into())
    }
}

pub fn quorum(cap: u32, reviewers: i64) -> i64 {
    reviewers.min(cap as i64)
}

/// The caller is responsible for checking that `user_id` may review the bid.
pub fn submit_decision<S: DecisionStore>(
    store: &S,
    bid_id: &str,
    user_id: &str,
    decision: BidDecision,
    quorum_cap: u32,
) -> Result<Bid, DecisionError> {
    let bid = store.bid(bid_id)?;
    if bid.status.is_terminal() {
        return Err(DecisionError::BidFinished(bid.id, bid.status));
    }

    let tender = store.tender(&bid.tender_id)?;
    if tender.status == TenderStatus::Closed {
        return Err(DecisionError::TenderClosed(tender.id));
    }

    if store.has_decided(bid_id, user_id)? {
        return Err(DecisionError::AlreadyDecided {
            bid_id: bid_id.to_string(),
            user_id: user_id.to_string(),
        });
    }
    store.record(bid_id, user_id, decision)?;

    match decision {
        BidDecision::Rejected => {
            check_transition(&bid.id, bid.status, BidStatus::Canceled)
                .map_err(DecisionError::Transition)?;
            log::info!("Bid [{}] rejected by [{}].", bid_id, user_id);
            Ok(store.set_bid_status(&bid, BidStatus::Canceled)?)
        }
        BidDecision::Approved => {
            let approvals = store.approvals(bid_id)?;
            let required = quorum(quorum_cap, store.reviewers(&tender.organization_id)?);
            log::debug!(
                "Bid [{}] approved by [{}], approvals: {}/{}.",
                bid_id,
                user_id,
                approvals,
                required
            );
            if approvals < required {
                return Ok(bid);
            }

            check_transition(&bid.id, bid.status, BidStatus::Approved)
                .map_err(DecisionError::Transition)?;
            let bid = store.set_bid_status(&bid, BidStatus::Approved)?;
            log::info!("Bid [{}] reached quorum and is approved.", bid_id);
            close_tender(store, &tender, bid_id)?;
            Ok(bid)
        }
    }
}

fn close_tender<S: DecisionStore>(
    store: &S,
    tender: &Tender,
    bid_id: &str,
) -> Result<(), StoreError> {
    match check_transition(&tender.id, tender.status, TenderStatus::Closed) {
        Ok(_) => {
            store.set_tender_status(tender, TenderStatus::Closed)?;
            log::info!("Tender [{}] closed by Bid [{}].", tender.id, bid_id);
        }
        Err(e) => log::error!(
            "Bid [{}] approved, but its Tender can't be closed: {}",
            bid_id,
            e
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use test_case::test_case;
    use tf_model::{AuthorType, ServiceType};

    use crate::db::EntityKind;

    struct FakeStore {
        bid: RefCell<Bid>,
        tender: RefCell<Tender>,
        decisions: RefCell<HashMap<String, BidDecision>>,
        reviewers: i64,
    }

    impl FakeStore {
        fn new(reviewers: i64) -> Self {
            let now = Utc::now().naive_utc();
            FakeStore {
                bid: RefCell::new(Bid {
                    id: "bid".to_string(),
                    name: "Bid".to_string(),
                    description: "Offer".to_string(),
                    status: BidStatus::Published,
                    tender_id: "tender".to_string(),
                    author_type: AuthorType::User,
                    author_id: "author".to_string(),
                    organization_id: "supplier".to_string(),
                    version: 1,
                    created_at: now,
                }),
                tender: RefCell::new(Tender {
                    id: "tender".to_string(),
                    name: "Tender".to_string(),
                    description: "Need".to_string(),
                    service_type: ServiceType::Delivery,
                    status: TenderStatus::Published,
                    organization_id: "buyer".to_string(),
                    version: 1,
                    created_at: now,
                    creator_username: "creator".to_string(),
                }),
                decisions: RefCell::new(HashMap::new()),
                reviewers,
            }
        }

        fn decide(&self, user: &str, decision: BidDecision) -> Result<Bid, DecisionError> {
            submit_decision(self, "bid", user, decision, 3)
        }
    }

    impl DecisionStore for FakeStore {
        fn bid(&self, bid_id: &str) -> Result<Bid, StoreError> {
            match bid_id {
                "bid" => Ok(self.bid.borrow().clone()),
                _ => Err(StoreError::NotFound(EntityKind::Bid, bid_id.to_string())),
            }
        }

        fn tender(&self, _tender_id: &str) -> Result<Tender, StoreError> {
            Ok(self.tender.borrow().clone())
        }

        fn has_decided(&self, _bid_id: &str, user_id: &str) -> Result<bool, StoreError> {
            Ok(self.decisions.borrow().contains_key(user_id))
        }

        fn record(&self, _bid_id: &str, user_id: &str, decision: BidDecision) -> Result<(), StoreError> {
            self.decisions
                .borrow_mut()
                .insert(user_id.to_string(), decision);
            Ok(())
        }

        fn approvals(&self, _bid_id: &str) -> Result<i64, StoreError> {
            Ok(self
                .decisions
                .borrow()
                .values()
                .filter(|d| **d == BidDecision::Approved)
                .count() as i64)
        }

        fn reviewers(&self, _organization_id: &str) -> Result<i64, StoreError> {
            Ok(self.reviewers)
        }

        fn set_bid_status(&self, _bid: &Bid, status: BidStatus) -> Result<Bid, StoreError> {
            self.bid.borrow_mut().status = status;
            Ok(self.bid.borrow().clone())
        }

        fn set_tender_status(&self, _tender: &Tender, status: TenderStatus) -> Result<Tender, StoreError> {
            self.tender.borrow_mut().status = status;
            Ok(self.tender.borrow().clone())
        }
    }

    #[test_case(1, 1)]
    #[test_case(2, 2)]
    #[test_case(3, 3)]
    #[test_case(5, 3)]
    #[test_case(0, 0)]
    fn test_quorum(reviewers: i64, expected: i64) {
        assert_eq!(quorum(3, reviewers), expected);
    }

    #[test]
    fn test_approval_below_quorum_keeps_bid_open() {
        let store = FakeStore::new(5);

        let bid = store.decide("r1", BidDecision::Approved).unwrap();
        assert_eq!(bid.status, BidStatus::Published);
        let bid = store.decide("r2", BidDecision::Approved).unwrap();
        assert_eq!(bid.status, BidStatus::Published);
        assert_eq!(store.tender.borrow().status, TenderStatus::Published);
    }

    #[test]
    fn test_quorum_approves_bid_and_closes_tender() {
        let store = FakeStore::new(5);

        store.decide("r1", BidDecision::Approved).unwrap();
        store.decide("r2", BidDecision::Approved).unwrap();
        let bid = store.decide("r3", BidDecision::Approved).unwrap();

        assert_eq!(bid.status, BidStatus::Approved);
        assert_eq!(store.tender.borrow().status, TenderStatus::Closed);
    }

    #[test]
    fn test_single_reviewer_is_quorum() {
        let store = FakeStore::new(1);

        let bid = store.decide("r1", BidDecision::Approved).unwrap();
        assert_eq!(bid.status, BidStatus::Approved);
        assert_eq!(store.tender.borrow().status, TenderStatus::Closed);
    }

    #[test]
    fn test_single_rejection_cancels_bid() {
        let store = FakeStore::new(5);

        store.decide("r1", BidDecision::Approved).unwrap();
        let bid = store.decide("r2", BidDecision::Rejected).unwrap();
        assert_eq!(bid.status, BidStatus::Canceled);
        assert_eq!(store.tender.borrow().status, TenderStatus::Published);

        let result = store.decide("r3", BidDecision::Approved);
        assert!(matches!(
            result,
            Err(DecisionError::BidFinished(_, BidStatus::Canceled))
        ));
        assert_eq!(store.decisions.borrow().len(), 2);
    }

    #[test]
    fn test_duplicate_decision_is_refused() {
        let store = FakeStore::new(5);

        store.decide("r1", BidDecision::Approved).unwrap();
        let result = store.decide("r1", BidDecision::Rejected);
        assert!(matches!(result, Err(DecisionError::AlreadyDecided { .. })));
        assert_eq!(store.bid.borrow().status, BidStatus::Published);
    }

    #[test]
    fn test_decision_on_closed_tender() {
        let store = FakeStore::new(5);
        store.tender.borrow_mut().status = TenderStatus::Closed;

        let result = store.decide("r1", BidDecision::Approved);
        assert!(matches!(result, Err(DecisionError::TenderClosed(_))));
        assert!(store.decisions.borrow().is_empty());
    }

    #[test]
    fn test_created_tender_is_not_closed_by_approval() {
        let store = FakeStore::new(1);
        store.tender.borrow_mut().status = TenderStatus::Created;

        let bid = store.decide("r1", BidDecision::Approved).unwrap();
        assert_eq!(bid.status, BidStatus::Approved);
        assert_eq!(store.tender.borrow().status, TenderStatus::Created);
    }

    #[test]
    fn test_unknown_bid() {
        let store = FakeStore::new(1);

        let result = submit_decision(&store, "other", "r1", BidDecision::Approved, 3);
        assert!(matches!(
            result,
            Err(DecisionError::Store(StoreError::NotFound(EntityKind::Bid, _)))
        ));
    }
}
