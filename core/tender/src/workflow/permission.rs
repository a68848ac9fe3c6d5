use std::sync::Arc;

use tf_model::{BidStatus, UserId};

use crate::db::model::{Bid, Tender};
use crate::identity::{IdentityApi, IdentityError};

#[derive(thiserror::Error, Debug)]
pub enum PermissionError {
    #[error("User [{0}] doesn't exist or is invalid.")]
    UserNotExist(String),
    #[error("User [{0}] has insufficient rights to perform this action.")]
    Denied(String),
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Resolved identity of the user performing an operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Caller {
    pub user_id: UserId,
    pub username: String,
}

/// Authorization predicates. Callers are resolved first, so an unknown user
/// is reported as such before any relation is examined.
#[derive(Clone)]
pub struct PermissionGuard {
    identity: Arc<dyn IdentityApi>,
}

impl PermissionGuard {
    pub fn new(identity: Arc<dyn IdentityApi>) -> Self {
        PermissionGuard { identity }
    }

    pub async fn caller(&self, username: &str) -> Result<Caller, PermissionError> {
        let user_id = self
            .identity
            .resolve_user(username)
            .await?
            .ok_or_else(|| PermissionError::UserNotExist(username.to_string()))?;
        Ok(Caller {
            user_id,
            username: username.to_string(),
        })
    }

    /// Organization a user acts for when placing a bid.
    pub async fn acting_organization(&self, user_id: &str) -> Result<String, PermissionError> {
        if !self.identity.user_exists(user_id).await? {
            return Err(PermissionError::UserNotExist(user_id.to_string()));
        }
        self.identity
            .organizations_of(user_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PermissionError::Denied(user_id.to_string()))
    }

    pub async fn organization_member(
        &self,
        caller: &Caller,
        organization_id: &str,
    ) -> Result<(), PermissionError> {
        let member = self
            .identity
            .is_responsible_for(&caller.user_id, organization_id)
            .await?;
        require(member, caller)
    }

    pub fn tender_creator(&self, caller: &Caller, tender: &Tender) -> Result<(), PermissionError> {
        require(tender.creator_username == caller.username, caller)
    }

    pub fn bid_author(&self, caller: &Caller, bid: &Bid) -> Result<(), PermissionError> {
        require(bid.author_id == caller.user_id, caller)
    }

    /// Users responsible for the tender's organization review its bids.
    pub async fn reviewer(&self, caller: &Caller, tender: &Tender) -> Result<(), PermissionError> {
        self.organization_member(caller, &tender.organization_id)
            .await
    }

    /// The author's side always sees the bid. Reviewers only see it once it
    /// left `Created`.
    pub async fn bid_viewer(
        &self,
        caller: &Caller,
        bid: &Bid,
        tender: &Tender,
    ) -> Result<(), PermissionError> {
        if bid.author_id == caller.user_id
            || self
                .identity
                .is_responsible_for(&caller.user_id, &bid.organization_id)
                .await?
        {
            return Ok(());
        }

        require(bid.status != BidStatus::Created, caller)?;
        self.reviewer(caller, tender).await
    }
}

fn require(allowed: bool, caller: &Caller) -> Result<(), PermissionError> {
    match allowed {
        true => Ok(()),
        false => Err(PermissionError::Denied(caller.username.clone())),
    }
}
