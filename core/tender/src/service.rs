use std::sync::Arc;

use tf_model::{
    Bid, BidDecision, BidEdit, BidReview, BidStatus, NewBid, NewTender, ServiceType, Tender,
    TenderEdit, TenderStatus,
};
use tf_persistence::DbExecutor;

use crate::config::Config;
use crate::db::dao::{BidDao, CreateBidError, DecisionDao, FeedbackDao, TenderDao};
use crate::db::model;
use crate::identity::IdentityApi;
use crate::utils::BidLock;
use crate::workflow::transition::author_may_set;
use crate::workflow::{Caller, PermissionGuard, WorkflowError};

type Result<T> = std::result::Result<T, WorkflowError>;

#[derive(thiserror::Error, Debug)]
pub enum TenderInitError {
    #[error("Failed to migrate tender database. Error: {0}.")]
    Migration(#[from] anyhow::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Entry point of every tender and bid operation. Each method checks the
/// caller's rights before touching the store.
pub struct TenderService {
    db: DbExecutor,
    guard: PermissionGuard,
    bid_lock: BidLock,
    config: Arc<Config>,
}

impl TenderService {
    pub fn new(
        db: DbExecutor,
        identity: Arc<dyn IdentityApi>,
        config: Arc<Config>,
    ) -> std::result::Result<Self, TenderInitError> {
        crate::db::dao::init(&db)?;
        Ok(TenderService {
            db,
            guard: PermissionGuard::new(identity),
            bid_lock: BidLock::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    async fn tender(&self, id: &str) -> Result<model::Tender> {
        Ok(self.db.as_dao::<TenderDao>().get(id).await?)
    }

    async fn bid(&self, id: &str) -> Result<model::Bid> {
        Ok(self.db.as_dao::<BidDao>().get(id).await?)
    }

    async fn own_tender(&self, id: &str, username: &str) -> Result<model::Tender> {
        let caller = self.guard.caller(username).await?;
        let tender = self.tender(id).await?;
        self.guard.tender_creator(&caller, &tender)?;
        Ok(tender)
    }

    async fn own_bid(&self, id: &str, username: &str) -> Result<(Caller, model::Bid)> {
        let caller = self.guard.caller(username).await?;
        let bid = self.bid(id).await?;
        self.guard.bid_author(&caller, &bid)?;
        Ok((caller, bid))
    }

    pub async fn list_tenders(
        &self,
        service_types: Vec<ServiceType>,
        page: Page,
    ) -> Result<Vec<Tender>> {
        Ok(self
            .db
            .as_dao::<TenderDao>()
            .list_published(service_types, page.limit, page.offset)
            .await?
            .into_iter()
            .map(model::Tender::into_client)
            .collect())
    }

    pub async fn create_tender(&self, tender: NewTender) -> Result<Tender> {
        let caller = self.guard.caller(&tender.creator_username).await?;
        self.guard
            .organization_member(&caller, &tender.organization_id)
            .await?;

        let tender = self.db.as_dao::<TenderDao>().create(tender).await?;
        log::info!(
            "User [{}] created Tender [{}] for Organization [{}].",
            caller.username,
            tender.id,
            tender.organization_id
        );
        Ok(tender.into_client())
    }

    pub async fn user_tenders(&self, username: &str, page: Page) -> Result<Vec<Tender>> {
        let caller = self.guard.caller(username).await?;
        Ok(self
            .db
            .as_dao::<TenderDao>()
            .list_by_creator(&caller.username, page.limit, page.offset)
            .await?
            .into_iter()
            .map(model::Tender::into_client)
            .collect())
    }

    pub async fn tender_status(&self, id: &str, username: &str) -> Result<TenderStatus> {
        let caller = self.guard.caller(username).await?;
        let tender = self.tender(id).await?;
        self.guard
            .organization_member(&caller, &tender.organization_id)
            .await?;
        Ok(tender.status)
    }

    pub async fn set_tender_status(
        &self,
        id: &str,
        username: &str,
        status: TenderStatus,
    ) -> Result<Tender> {
        self.own_tender(id, username).await?;
        let tender = self.db.as_dao::<TenderDao>().set_status(id, status).await?;
        Ok(tender.into_client())
    }

    pub async fn edit_tender(&self, id: &str, username: &str, edit: TenderEdit) -> Result<Tender> {
        self.own_tender(id, username).await?;
        let tender = self.db.as_dao::<TenderDao>().edit(id, edit).await?;
        Ok(tender.into_client())
    }

    pub async fn rollback_tender(&self, id: &str, version: i32, username: &str) -> Result<Tender> {
        self.own_tender(id, username).await?;
        let tender = self.db.as_dao::<TenderDao>().rollback(id, version).await?;
        Ok(tender.into_client())
    }

    pub async fn create_bid(&self, bid: NewBid) -> Result<Bid> {
        self.tender(&bid.tender_id).await?;
        let organization_id = self.guard.acting_organization(&bid.author_id).await?;

        let bid = self
            .db
            .as_dao::<BidDao>()
            .create(bid, &organization_id)
            .await
            .map_err(|e| match e {
                CreateBidError::TenderNotPublished(id) => WorkflowError::TenderClosed(id),
                CreateBidError::AlreadyPlaced { .. } => WorkflowError::Conflict(e.to_string()),
                CreateBidError::Store(e) => e.into(),
            })?;
        log::info!(
            "User [{}] placed Bid [{}] on Tender [{}].",
            bid.author_id,
            bid.id,
            bid.tender_id
        );
        Ok(bid.into_client())
    }

    pub async fn user_bids(&self, username: &str, page: Page) -> Result<Vec<Bid>> {
        let caller = self.guard.caller(username).await?;
        Ok(self
            .db
            .as_dao::<BidDao>()
            .list_by_author(&caller.user_id, page.limit, page.offset)
            .await?
            .into_iter()
            .map(model::Bid::into_client)
            .collect())
    }

    pub async fn tender_bids(&self, tender_id: &str, username: &str, page: Page) -> Result<Vec<Bid>> {
        let caller = self.guard.caller(username).await?;
        let tender = self.tender(tender_id).await?;
        self.guard.reviewer(&caller, &tender).await?;

        let bids = self
            .db
            .as_dao::<BidDao>()
            .list_for_tender(tender_id, page.limit, page.offset)
            .await?;
        if bids.is_empty() {
            return Err(WorkflowError::NotFound(format!(
                "No bids on Tender [{}].",
                tender_id
            )));
        }
        Ok(bids.into_iter().map(model::Bid::into_client).collect())
    }

    pub async fn bid_status(&self, id: &str, username: &str) -> Result<BidStatus> {
        let caller = self.guard.caller(username).await?;
        let bid = self.bid(id).await?;
        let tender = self.tender(&bid.tender_id).await?;
        self.guard.bid_viewer(&caller, &bid, &tender).await?;
        Ok(bid.status)
    }

    /// Lets the author publish or withdraw a bid without a reviewer decision.
    pub async fn set_bid_status(&self, id: &str, username: &str, status: BidStatus) -> Result<Bid> {
        let (caller, _) = self.own_bid(id, username).await?;
        if !author_may_set(status) {
            return Err(WorkflowError::PermissionDenied(format!(
                "User [{}] can't set Bid [{}] status to {}, only reviewers decide on it.",
                caller.username, id, status
            )));
        }

        let bid = self.db.as_dao::<BidDao>().set_status(id, status).await?;
        Ok(bid.into_client())
    }

    pub async fn edit_bid(&self, id: &str, username: &str, edit: BidEdit) -> Result<Bid> {
        self.own_bid(id, username).await?;
        let bid = self.db.as_dao::<BidDao>().edit(id, edit).await?;
        Ok(bid.into_client())
    }

    pub async fn rollback_bid(&self, id: &str, version: i32, username: &str) -> Result<Bid> {
        self.own_bid(id, username).await?;
        let bid = self.db.as_dao::<BidDao>().rollback(id, version).await?;
        Ok(bid.into_client())
    }

    pub async fn submit_decision(
        &self,
        id: &str,
        username: &str,
        decision: BidDecision,
    ) -> Result<Bid> {
        let caller = self.guard.caller(username).await?;
        let bid = self.bid(id).await?;
        let tender = self.tender(&bid.tender_id).await?;
        self.guard.reviewer(&caller, &tender).await?;

        let lock = self.bid_lock.get_lock(id).await;
        let guard = lock.lock().await;
        let result = self
            .db
            .as_dao::<DecisionDao>()
            .submit(id, &caller.user_id, decision, self.config.decision.quorum_cap)
            .await;
        drop(guard);
        drop(lock);
        self.bid_lock.release(id).await;

        Ok(result?.into_client())
    }

    /// Reviewers comment on bids they can see.
    pub async fn submit_feedback(&self, id: &str, username: &str, feedback: &str) -> Result<Bid> {
        let caller = self.guard.caller(username).await?;
        let bid = self.bid(id).await?;
        let tender = self.tender(&bid.tender_id).await?;
        self.guard.reviewer(&caller, &tender).await?;
        if bid.status == BidStatus::Created {
            return Err(WorkflowError::PermissionDenied(format!(
                "Bid [{}] isn't published yet.",
                id
            )));
        }

        self.db.as_dao::<FeedbackDao>().create(id, feedback).await?;
        log::debug!("User [{}] left feedback on Bid [{}].", caller.username, id);
        Ok(bid.into_client())
    }

    /// Feedback on all bids the author placed on the tender. Visible to the
    /// author and to the tender's reviewers.
    pub async fn bid_reviews(
        &self,
        tender_id: &str,
        author_username: &str,
        requester_username: &str,
        page: Page,
    ) -> Result<Vec<BidReview>> {
        let requester = self.guard.caller(requester_username).await?;
        let tender = self.tender(tender_id).await?;
        let author = self.guard.caller(author_username).await?;
        if author != requester {
            self.guard.reviewer(&requester, &tender).await?;
        }

        let reviews = self
            .db
            .as_dao::<FeedbackDao>()
            .list_for_author(tender_id, &author.user_id, page.limit, page.offset)
            .await?;
        if reviews.is_empty() {
            return Err(WorkflowError::NotFound(format!(
                "No reviews of [{}] bids on Tender [{}].",
                author_username, tender_id
            )));
        }
        Ok(reviews
            .into_iter()
            .map(model::BidFeedback::into_client)
            .collect())
    }
}
