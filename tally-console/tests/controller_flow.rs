//! Controller behaviour against an in-memory repository

mod support;

use std::sync::Arc;

use rust_decimal::Decimal;
use shared::models::{Admin, AdminUpdate, Product, ProductCreate, ProductUpdate};
use shared::{AppError, CrudAction, ErrorKind};
use tally_console::{NoticeBoard, NoticeLevel, RequestStatus, ResourceController};

use support::{MemoryRepo, admin, product, products};

fn admins_controller(repo: &Arc<MemoryRepo<Admin>>) -> ResourceController<Admin> {
    ResourceController::new(repo.clone(), NoticeBoard::new())
}

fn product_repo() -> Arc<MemoryRepo<Product>> {
    Arc::new(MemoryRepo::new(products(), |payload: &ProductCreate, n| Product {
        id: format!("new{n}"),
        name: payload.name.clone(),
        barcode: payload.barcode.clone(),
        net_price: payload.net_price,
        sell_price: payload.sell_price,
        cost_price: payload.cost_price,
        quantity: payload.quantity,
        min_quantity: payload.min_quantity,
        expires_at: payload.expires_at,
        restock_at: payload.restock_at,
        category: payload.category.clone(),
        brand: payload.brand.clone(),
        branch: None,
    }))
}

fn new_product(name: &str) -> ProductCreate {
    ProductCreate {
        name: name.into(),
        barcode: None,
        net_price: Decimal::ONE,
        sell_price: Decimal::TWO,
        cost_price: Decimal::ONE,
        quantity: 5,
        min_quantity: 1,
        expires_at: None,
        restock_at: None,
        category: None,
        brand: None,
    }
}

#[tokio::test]
async fn test_update_replaces_only_the_matching_record() {
    let repo = Arc::new(MemoryRepo::seeded(vec![
        admin("a", "Ana", 100),
        admin("b", "Ben", 200),
    ]));
    let ctl = admins_controller(&repo);
    assert_eq!(ctl.refresh().await.unwrap(), 2);

    let update = AdminUpdate {
        salary: Some(Decimal::from(150)),
        ..Default::default()
    };
    let updated = ctl.update("a", update).await.unwrap();
    assert_eq!(updated.salary, Decimal::from(150));

    let records = ctl.snapshot().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].uuid, "a");
    assert_eq!(records[0].salary, Decimal::from(150));
    assert_eq!(records[1], admin("b", "Ben", 200));
    assert_eq!(
        ctl.notices().last().map(|n| n.message),
        Some("Admin updated".to_string())
    );
}

#[tokio::test]
async fn test_delete_removes_only_the_matching_record() {
    let repo = Arc::new(MemoryRepo::seeded(vec![
        admin("a", "Ana", 100),
        admin("b", "Ben", 200),
    ]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();

    ctl.delete("b").await.unwrap();

    let keys: Vec<String> = ctl.snapshot().await.into_iter().map(|a| a.uuid).collect();
    assert_eq!(keys, vec!["a"]);
    assert_eq!(repo.records().len(), 1);
}

#[tokio::test]
async fn test_create_appends_server_record() {
    let repo = product_repo();
    let ctl = ResourceController::new(repo.clone(), NoticeBoard::new());
    ctl.refresh().await.unwrap();

    let created = ctl.create(new_product("Lemonade")).await.unwrap();
    assert_eq!(created.id, "new6");

    let records = ctl.snapshot().await;
    assert_eq!(records.len(), 6);
    assert_eq!(records.last().map(|p| p.name.as_str()), Some("Lemonade"));
    assert_eq!(
        ctl.notices().last().map(|n| n.level),
        Some(NoticeLevel::Success)
    );
}

#[tokio::test]
async fn test_dispatch_routes_actions() {
    let repo = product_repo();
    let ctl = ResourceController::new(repo.clone(), NoticeBoard::new());
    ctl.refresh().await.unwrap();

    let renamed = ctl
        .dispatch(CrudAction::Update {
            id: "p2".into(),
            data: ProductUpdate {
                name: Some("Green tea".into()),
                ..Default::default()
            },
        })
        .await
        .unwrap();
    assert_eq!(renamed.map(|p| p.name), Some("Green tea".to_string()));

    let deleted = ctl
        .dispatch(CrudAction::Delete { id: "p2".into() })
        .await
        .unwrap();
    assert!(deleted.is_none());
    assert!(ctl.get("p2").await.is_none());
}

#[tokio::test]
async fn test_missing_record_never_reaches_repository() {
    let repo = Arc::new(MemoryRepo::seeded(vec![admin("a", "Ana", 100)]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();
    let calls = repo.calls();

    let err = ctl
        .update("zzz", AdminUpdate::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Missing);

    let err = ctl.delete("zzz").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Missing);

    assert_eq!(repo.calls(), calls);
    assert_eq!(ctl.len().await, 1);
    assert_eq!(ctl.notices().len(), 2);
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_repository() {
    let repo = Arc::new(MemoryRepo::seeded(vec![admin("a", "Ana", 100)]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();
    let calls = repo.calls();

    let err = ctl
        .update(
            "a",
            AdminUpdate {
                salary: Some(Decimal::from(-5)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(repo.calls(), calls);
    assert_eq!(ctl.get("a").await, Some(admin("a", "Ana", 100)));
    assert_eq!(
        ctl.notices().last().map(|n| n.level),
        Some(NoticeLevel::Warning)
    );
}

#[tokio::test]
async fn test_server_failure_keeps_collection() {
    let repo = Arc::new(MemoryRepo::seeded(vec![
        admin("a", "Ana", 100),
        admin("b", "Ben", 200),
    ]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();
    let before = ctl.snapshot().await;

    repo.fail_next(AppError::business("Admin has open shifts"));
    let err = ctl.delete("b").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Business);
    assert_eq!(err.message, "Admin has open shifts");
    assert_eq!(ctl.snapshot().await, before);

    let notice = ctl.notices().last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Admin has open shifts");
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_items() {
    let repo = Arc::new(MemoryRepo::seeded(vec![admin("a", "Ana", 100)]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();

    repo.fail_next(AppError::transport("connection reset"));
    let err = ctl.refresh().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transport);
    assert_eq!(ctl.status().await, RequestStatus::Rejected);
    assert_eq!(ctl.error().await.map(|e| e.kind), Some(ErrorKind::Transport));
    assert_eq!(ctl.len().await, 1);
}

#[tokio::test]
async fn test_second_mutation_on_same_record_is_busy() {
    let repo = Arc::new(MemoryRepo::seeded(vec![admin("a", "Ana", 100)]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();

    let hold = repo.hold_next();
    let first = {
        let ctl = ctl.clone();
        tokio::spawn(async move {
            ctl.update(
                "a",
                AdminUpdate {
                    salary: Some(Decimal::from(120)),
                    ..Default::default()
                },
            )
            .await
        })
    };
    hold.started.notified().await;

    let err = ctl.delete("a").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Busy);

    hold.release.notify_one();
    let updated = first.await.unwrap().unwrap();
    assert_eq!(updated.salary, Decimal::from(120));

    // The guard is released once the first request settles
    ctl.delete("a").await.unwrap();
    assert!(ctl.is_empty().await);
}

#[tokio::test]
async fn test_newer_refresh_supersedes_older() {
    let repo = Arc::new(MemoryRepo::seeded(vec![admin("old", "Old", 1)]));
    let ctl = admins_controller(&repo);

    let hold = repo.hold_next();
    let stale = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.refresh().await })
    };
    hold.started.notified().await;

    repo.set_records(vec![admin("a", "Ana", 100), admin("b", "Ben", 200)]);
    assert_eq!(ctl.refresh().await.unwrap(), 2);
    hold.release.notify_one();

    let err = stale.await.unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Superseded);

    let keys: Vec<String> = ctl.snapshot().await.into_iter().map(|a| a.uuid).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert_eq!(ctl.status().await, RequestStatus::Fulfilled);
    // Superseded fetches stay silent
    assert!(ctl.notices().is_empty());
}

#[tokio::test]
async fn test_mutation_supersedes_pending_refresh() {
    let repo = Arc::new(MemoryRepo::seeded(vec![admin("a", "Ana", 100)]));
    let ctl = admins_controller(&repo);
    ctl.refresh().await.unwrap();

    let hold = repo.hold_next();
    let pending = {
        let ctl = ctl.clone();
        tokio::spawn(async move { ctl.refresh().await })
    };
    hold.started.notified().await;
    assert_eq!(ctl.status().await, RequestStatus::Pending);

    ctl.update(
        "a",
        AdminUpdate {
            first_name: Some("Anna".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    hold.release.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.kind, ErrorKind::Superseded);
    assert_eq!(ctl.get("a").await.map(|a| a.first_name), Some("Anna".into()));
    assert_eq!(ctl.status().await, RequestStatus::Fulfilled);
}

#[tokio::test]
async fn test_unauthorized_raises_expiry_flag() {
    let repo = Arc::new(MemoryRepo::seeded(vec![product("p1", "Cola", 1, "1")]));
    let flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let ctl = ResourceController::new(repo.clone(), NoticeBoard::new()).with_expiry_flag(flag.clone());

    repo.fail_next(AppError::unauthorized());
    let err = ctl.refresh().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert!(flag.load(std::sync::atomic::Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_refreshes_settle_on_latest() {
    let repo = Arc::new(MemoryRepo::seeded(vec![
        admin("a", "Ana", 100),
        admin("b", "Ben", 200),
    ]));
    let ctl = admins_controller(&repo);

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let ctl = ctl.clone();
            tokio::spawn(async move { ctl.refresh().await })
        })
        .collect();

    let mut applied = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(count) => {
                assert_eq!(count, 2);
                applied += 1;
            }
            Err(err) => assert_eq!(err.kind, ErrorKind::Superseded),
        }
    }

    // The newest fetch is never cancelled by an older one
    assert!(applied >= 1);
    assert_eq!(ctl.status().await, RequestStatus::Fulfilled);
    assert!(ctl.error().await.is_none());
    assert!(ctl.notices().is_empty());
}
