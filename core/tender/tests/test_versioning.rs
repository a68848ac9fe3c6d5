use std::sync::Arc;
use tempdir::TempDir;

use tf_model::{BidEdit, BidStatus, ServiceType, TenderEdit, TenderStatus};
use tf_persistence::DbExecutor;
use tf_tender::testing::{
    add_team, bid_history, sample_bid, sample_tender, tender_history, tender_service, test_config,
    test_db,
};
use tf_tender::{TenderService, WorkflowError};

struct Fixture {
    _dir: TempDir,
    db: DbExecutor,
    service: Arc<TenderService>,
    organization_id: String,
}

async fn fixture() -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new("versioning").unwrap();
    let config = test_config(3);
    let db = test_db(dir.path(), &config);
    let service = tender_service(&db, config);
    let (organization_id, _) = add_team(&db, "Buyer", &["alice", "bob"]).await;
    Fixture {
        _dir: dir,
        db,
        service,
        organization_id,
    }
}

fn rename(name: &str) -> TenderEdit {
    TenderEdit {
        name: Some(name.to_string()),
        ..TenderEdit::default()
    }
}

#[actix_rt::test]
async fn test_edit_snapshots_previous_version() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();
    assert_eq!(tender.version, 1);
    assert_eq!(tender.status, TenderStatus::Created);

    let edited = f
        .service
        .edit_tender(&tender.id, "alice", rename("Roof repair"))
        .await
        .unwrap();
    assert_eq!(edited.version, 2);
    assert_eq!(edited.name, "Roof repair");
    assert_eq!(edited.description, tender.description);

    let edited = f
        .service
        .edit_tender(
            &tender.id,
            "alice",
            TenderEdit {
                service_type: Some(ServiceType::Delivery),
                ..TenderEdit::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.version, 3);
    assert_eq!(edited.name, "Roof repair");
    assert_eq!(edited.service_type, ServiceType::Delivery);

    let history = tender_history(&f.db, &tender.id).await.unwrap();
    let versions: Vec<(i32, &str)> = history
        .iter()
        .map(|s| (s.version, s.name.as_str()))
        .collect();
    assert_eq!(versions, vec![(1, "Office renovation"), (2, "Roof repair")]);
    assert_eq!(history[1].service_type, ServiceType::Construction);
}

#[actix_rt::test]
async fn test_empty_edit_is_rejected_without_snapshot() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();

    let result = f
        .service
        .edit_tender(&tender.id, "alice", TenderEdit::default())
        .await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));

    assert!(tender_history(&f.db, &tender.id).await.unwrap().is_empty());
    let status = f.service.tender_status(&tender.id, "alice").await.unwrap();
    assert_eq!(status, TenderStatus::Created);
}

#[actix_rt::test]
async fn test_rollback_adds_new_version() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();
    f.service
        .edit_tender(&tender.id, "alice", rename("Second"))
        .await
        .unwrap();
    f.service
        .edit_tender(&tender.id, "alice", rename("Third"))
        .await
        .unwrap();

    let restored = f
        .service
        .rollback_tender(&tender.id, 1, "alice")
        .await
        .unwrap();
    assert_eq!(restored.version, 4);
    assert_eq!(restored.name, "Office renovation");

    // Snapshots are never rewritten, the state before rollback is kept too.
    let history = tender_history(&f.db, &tender.id).await.unwrap();
    let versions: Vec<(i32, &str)> = history
        .iter()
        .map(|s| (s.version, s.name.as_str()))
        .collect();
    assert_eq!(
        versions,
        vec![(1, "Office renovation"), (2, "Second"), (3, "Third")]
    );

    let again = f
        .service
        .rollback_tender(&tender.id, 3, "alice")
        .await
        .unwrap();
    assert_eq!(again.version, 5);
    assert_eq!(again.name, "Third");
}

#[actix_rt::test]
async fn test_rollback_to_current_version_creates_identical_version() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();

    let restored = f
        .service
        .rollback_tender(&tender.id, 1, "alice")
        .await
        .unwrap();
    assert_eq!(restored.version, 2);
    assert_eq!(restored.name, tender.name);
    assert_eq!(restored.description, tender.description);
}

#[actix_rt::test]
async fn test_rollback_to_missing_version() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();

    for version in [0, 7] {
        let result = f.service.rollback_tender(&tender.id, version, "alice").await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
    }
    // The failed rollback must not leave its snapshot behind.
    assert!(tender_history(&f.db, &tender.id).await.unwrap().is_empty());

    let result = f
        .service
        .rollback_tender("00000000-0000-0000-0000-000000000000", 1, "alice")
        .await;
    assert!(matches!(result, Err(WorkflowError::NotFound(_))));
}

#[actix_rt::test]
async fn test_status_change_keeps_version() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();

    let published = f
        .service
        .set_tender_status(&tender.id, "alice", TenderStatus::Published)
        .await
        .unwrap();
    assert_eq!(published.status, TenderStatus::Published);
    assert_eq!(published.version, 1);

    let result = f
        .service
        .set_tender_status(&tender.id, "alice", TenderStatus::Created)
        .await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));

    let same = f
        .service
        .set_tender_status(&tender.id, "alice", TenderStatus::Published)
        .await
        .unwrap();
    assert_eq!(same.status, TenderStatus::Published);
}

#[actix_rt::test]
async fn test_closed_tender_refuses_changes() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();
    f.service
        .edit_tender(&tender.id, "alice", rename("Second"))
        .await
        .unwrap();
    for status in [TenderStatus::Published, TenderStatus::Closed] {
        f.service
            .set_tender_status(&tender.id, "alice", status)
            .await
            .unwrap();
    }

    let result = f
        .service
        .edit_tender(&tender.id, "alice", rename("Third"))
        .await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));
    let result = f.service.rollback_tender(&tender.id, 1, "alice").await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));

    assert_eq!(tender_history(&f.db, &tender.id).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_only_creator_edits_tender() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();

    let result = f
        .service
        .edit_tender(&tender.id, "bob", rename("Hijacked"))
        .await;
    assert!(matches!(result, Err(WorkflowError::PermissionDenied(_))));

    let result = f
        .service
        .rollback_tender(&tender.id, 1, "mallory")
        .await;
    assert!(matches!(result, Err(WorkflowError::UserNotExist(_))));
}

#[actix_rt::test]
async fn test_bid_versioning() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();
    f.service
        .set_tender_status(&tender.id, "alice", TenderStatus::Published)
        .await
        .unwrap();
    let (_, sellers) = add_team(&f.db, "Seller", &["carol"]).await;

    let bid = f
        .service
        .create_bid(sample_bid(&tender.id, &sellers[0]))
        .await
        .unwrap();
    assert_eq!(bid.version, 1);
    assert_eq!(bid.status, BidStatus::Created);

    let edited = f
        .service
        .edit_bid(
            &bid.id,
            "carol",
            BidEdit {
                description: Some("Crew of six".to_string()),
                ..BidEdit::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.version, 2);
    assert_eq!(edited.name, bid.name);
    assert_eq!(edited.description, "Crew of six");

    let restored = f.service.rollback_bid(&bid.id, 1, "carol").await.unwrap();
    assert_eq!(restored.version, 3);
    assert_eq!(restored.description, bid.description);

    let history = bid_history(&f.db, &bid.id).await.unwrap();
    assert_eq!(
        history.iter().map(|s| s.version).collect::<Vec<_>>(),
        vec![1, 2]
    );

    let result = f
        .service
        .edit_bid(&bid.id, "carol", BidEdit::default())
        .await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));

    let result = f
        .service
        .edit_bid(
            &bid.id,
            "alice",
            BidEdit {
                name: Some("Mine now".to_string()),
                ..BidEdit::default()
            },
        )
        .await;
    assert!(matches!(result, Err(WorkflowError::PermissionDenied(_))));
}

#[actix_rt::test]
async fn test_terminal_bid_refuses_changes() {
    let f = fixture().await;
    let tender = f
        .service
        .create_tender(sample_tender(&f.organization_id, "alice"))
        .await
        .unwrap();
    f.service
        .set_tender_status(&tender.id, "alice", TenderStatus::Published)
        .await
        .unwrap();
    let (_, sellers) = add_team(&f.db, "Seller", &["carol"]).await;
    let bid = f
        .service
        .create_bid(sample_bid(&tender.id, &sellers[0]))
        .await
        .unwrap();

    let canceled = f
        .service
        .set_bid_status(&bid.id, "carol", BidStatus::Canceled)
        .await
        .unwrap();
    assert_eq!(canceled.status, BidStatus::Canceled);

    let result = f
        .service
        .edit_bid(
            &bid.id,
            "carol",
            BidEdit {
                name: Some("Too late".to_string()),
                ..BidEdit::default()
            },
        )
        .await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));
    let result = f
        .service
        .set_bid_status(&bid.id, "carol", BidStatus::Published)
        .await;
    assert!(matches!(result, Err(WorkflowError::Conflict(_))));
    assert!(bid_history(&f.db, &bid.id).await.unwrap().is_empty());
}
