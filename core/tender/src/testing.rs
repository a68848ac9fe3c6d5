//! Helpers for integration tests: a seeded identity directory, a service
//! over a temporary database and read access to version history.
use std::path::Path;
use std::sync::Arc;

use tf_model::{
    AuthorType, BidDecision, NewBid, NewTender, OrganizationId, ServiceType, UserId,
};
use tf_persistence::DbExecutor;

use crate::config::{Config, DbConfig, DecisionConfig, PaginationConfig};
use crate::db::dao::{BidDao, DecisionDao, IdentityDao, TenderDao};
use crate::db::StoreError;
use crate::identity::IdentityDb;
use crate::service::TenderService;

pub use crate::db::model::{BidSnapshot, TenderSnapshot};

pub fn test_config(quorum_cap: u32) -> Config {
    Config {
        decision: DecisionConfig { quorum_cap },
        pagination: PaginationConfig {
            page_limit_default: 5,
            page_limit_max: 100,
        },
        db: DbConfig {
            busy_timeout: std::time::Duration::from_secs(5),
            pool_size: 4,
        },
    }
}

/// Database file `tender.db` inside `dir`.
pub fn test_db(dir: &Path, config: &Config) -> DbExecutor {
    let path = dir.join("tender.db");
    DbExecutor::with_options(path.to_string_lossy(), config.db.options())
        .expect("Failed to open test database")
}

pub fn tender_service(db: &DbExecutor, config: Config) -> Arc<TenderService> {
    let identity = Arc::new(IdentityDb::new(db.clone()));
    Arc::new(
        TenderService::new(db.clone(), identity, Arc::new(config))
            .expect("Failed to create TenderService"),
    )
}

pub async fn add_employee(db: &DbExecutor, username: &str) -> UserId {
    let id = uuid::Uuid::new_v4().to_string();
    db.as_dao::<IdentityDao>()
        .insert_employee(&id, username, Some(username), None)
        .await
        .expect("Failed to add employee")
}

pub async fn add_organization(db: &DbExecutor, name: &str) -> OrganizationId {
    let id = uuid::Uuid::new_v4().to_string();
    db.as_dao::<IdentityDao>()
        .insert_organization(&id, name, Some("LLC"))
        .await
        .expect("Failed to add organization")
}

pub async fn add_responsible(db: &DbExecutor, organization_id: &str, user_id: &str) {
    db.as_dao::<IdentityDao>()
        .make_responsible(organization_id, user_id)
        .await
        .expect("Failed to make employee responsible")
}

/// Organization with `usernames` responsible for it. Returns the organization
/// and user ids in the same order.
pub async fn add_team(
    db: &DbExecutor,
    organization: &str,
    usernames: &[&str],
) -> (OrganizationId, Vec<UserId>) {
    let organization_id = add_organization(db, organization).await;
    let mut users = Vec::new();
    for username in usernames {
        let user_id = add_employee(db, username).await;
        add_responsible(db, &organization_id, &user_id).await;
        users.push(user_id);
    }
    (organization_id, users)
}

pub fn sample_tender(organization_id: &str, creator_username: &str) -> NewTender {
    NewTender {
        name: "Office renovation".to_string(),
        description: "Renovate the second floor".to_string(),
        service_type: ServiceType::Construction,
        organization_id: organization_id.to_string(),
        creator_username: creator_username.to_string(),
    }
}

pub fn sample_bid(tender_id: &str, author_id: &str) -> NewBid {
    NewBid {
        name: "Renovation in two weeks".to_string(),
        description: "Crew of five, materials included".to_string(),
        tender_id: tender_id.to_string(),
        author_type: AuthorType::User,
        author_id: author_id.to_string(),
    }
}

pub async fn tender_history(
    db: &DbExecutor,
    tender_id: &str,
) -> Result<Vec<TenderSnapshot>, StoreError> {
    db.as_dao::<TenderDao>().history(tender_id).await
}

pub async fn bid_history(db: &DbExecutor, bid_id: &str) -> Result<Vec<BidSnapshot>, StoreError> {
    db.as_dao::<BidDao>().history(bid_id).await
}

pub async fn decisions(
    db: &DbExecutor,
    bid_id: &str,
) -> Result<Vec<(UserId, BidDecision)>, StoreError> {
    db.as_dao::<DecisionDao>().list(bid_id).await
}
