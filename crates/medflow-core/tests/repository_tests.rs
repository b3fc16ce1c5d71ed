//! AppointmentRepository Tests
//!
//! Collection persistence, owner scoping and ordering.

use chrono::Duration;
use medflow_core::keys::APPOINTMENTS_KEY;
use medflow_core::{
    select_for_owner, AppointmentId, AppointmentRecord, AppointmentRepository, AppointmentStatus,
    AppointmentViews,
};
use medflow_store::FileStore;
use medflow_test_utils::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

#[tokio::test]
async fn test_absent_collection_is_empty() {
    let store = memory_store();
    let repo = AppointmentRepository::new(shared(&store));

    assert!(repo.all().await.is_empty());
    assert!(repo.is_empty().await);
}

#[tokio::test]
async fn test_malformed_collection_is_empty() {
    let store = memory_store();
    store.put_raw(APPOINTMENTS_KEY, "{not json");
    let repo = AppointmentRepository::new(shared(&store));

    assert!(repo.all().await.is_empty());
    assert!(repo.for_owner(&cc("A1")).await.is_empty());
}

#[tokio::test]
async fn test_append_then_reload() {
    let store = memory_store();
    let repo = AppointmentRepository::new(shared(&store));

    let first = create_test_record("A1", "2025-05-02T09:00:00Z", AppointmentStatus::Upcoming);
    let second = create_test_record("B2", "2025-05-01T09:00:00Z", AppointmentStatus::Cancelled);
    repo.append(first.clone()).await.unwrap();
    repo.append(second.clone()).await.unwrap();

    // A fresh repository over the same store sees the same sequence
    let reloaded = AppointmentRepository::new(shared(&store)).all().await;
    assert_eq!(reloaded, vec![first, second]);
}

#[tokio::test]
async fn test_roundtrip_through_file_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let record = create_test_record("A1", "2025-05-02T09:00:00Z", AppointmentStatus::Upcoming);

    {
        let store = FileStore::open(dir.path()).await.unwrap();
        let repo = AppointmentRepository::new(Arc::new(store));
        repo.append(record.clone()).await.unwrap();
    }

    let store = FileStore::open(dir.path()).await.unwrap();
    let repo = AppointmentRepository::new(Arc::new(store));
    assert_eq!(repo.all().await, vec![record]);
}

#[tokio::test]
async fn test_for_owner_filters_and_sorts() {
    let store = memory_store();
    let late = create_test_record("A1", "2025-06-01T09:00:00Z", AppointmentStatus::Upcoming);
    let other = create_test_record("B2", "2025-05-15T09:00:00Z", AppointmentStatus::Upcoming);
    let early = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Completed);
    seed_records(&store, &[late.clone(), other, early.clone()]);

    let repo = AppointmentRepository::new(shared(&store));
    assert_eq!(repo.for_owner(&cc("A1")).await, vec![early, late]);
}

#[tokio::test]
async fn test_for_owner_ties_keep_insertion_order() {
    let store = memory_store();
    let a = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Upcoming);
    let b = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Cancelled);
    let c = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Upcoming);
    seed_records(&store, &[a.clone(), b.clone(), c.clone()]);

    let repo = AppointmentRepository::new(shared(&store));
    let ids: Vec<_> = repo.for_owner(&cc("A1")).await.into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn test_update_status_unknown_id_writes_nothing() {
    let store = memory_store();
    let record = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Upcoming);
    seed_records(&store, &[record]);
    let before = store.peek(APPOINTMENTS_KEY);

    let repo = AppointmentRepository::new(shared(&store));
    let result = repo
        .update_status(&AppointmentId::from_raw("missing"), AppointmentStatus::Cancelled)
        .await
        .unwrap();

    assert!(result.is_none());
    assert_eq!(store.peek(APPOINTMENTS_KEY), before);
}

#[tokio::test]
async fn test_update_status_overwrites_without_legality_check() {
    let store = memory_store();
    let record = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Cancelled);
    seed_records(&store, &[record.clone()]);

    let repo = AppointmentRepository::new(shared(&store));
    let updated = repo
        .update_status(&record.id, AppointmentStatus::Completed)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, AppointmentStatus::Completed);
    assert_eq!(
        repo.find(&record.id).await.unwrap().status,
        AppointmentStatus::Completed
    );
    // Everything but the status is untouched
    assert_eq!(
        AppointmentRecord {
            status: AppointmentStatus::Cancelled,
            ..updated
        },
        record
    );
}

#[tokio::test]
async fn test_update_status_checked_guard_vetoes_write() {
    let store = memory_store();
    let record = create_test_record("A1", "2025-05-01T09:00:00Z", AppointmentStatus::Upcoming);
    seed_records(&store, &[record.clone()]);
    let before = store.peek(APPOINTMENTS_KEY);

    #[derive(Debug)]
    struct Vetoed;
    impl From<medflow_store::StoreError> for Vetoed {
        fn from(_: medflow_store::StoreError) -> Self {
            Vetoed
        }
    }

    let repo = AppointmentRepository::new(shared(&store));
    let result = repo
        .update_status_checked(&record.id, AppointmentStatus::Cancelled, |_| Err(Vetoed))
        .await;

    assert!(result.is_err());
    assert_eq!(store.peek(APPOINTMENTS_KEY), before);
}

fn arb_records() -> impl Strategy<Value = Vec<AppointmentRecord>> {
    prop::collection::vec((0usize..3, 0i64..200, 0usize..3), 0..40).prop_map(|specs| {
        let base = at("2025-05-01T00:00:00Z");
        specs
            .into_iter()
            .map(|(owner, minutes, status)| {
                let mut record = create_test_record(
                    ["A1", "B2", "C3"][owner],
                    "2025-05-01T00:00:00Z",
                    AppointmentStatus::ALL[status],
                );
                record.scheduled_at = base + Duration::minutes(minutes * 15);
                record
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_for_owner_only_returns_owner_records(records in arb_records()) {
        let owner = cc("A1");
        let owned = select_for_owner(records.clone(), &owner);

        prop_assert!(owned.iter().all(|r| r.owner_id == owner));
        prop_assert_eq!(
            owned.len(),
            records.iter().filter(|r| r.owner_id == owner).count()
        );
    }

    #[test]
    fn prop_for_owner_is_non_decreasing(records in arb_records()) {
        let owned = select_for_owner(records, &cc("B2"));
        prop_assert!(owned.windows(2).all(|w| w[0].scheduled_at <= w[1].scheduled_at));
    }

    #[test]
    fn prop_views_partition_owner_records(records in arb_records()) {
        let owned = select_for_owner(records, &cc("C3"));
        let views = AppointmentViews::from_owned(owned.clone());

        prop_assert!(views.upcoming.iter().all(|r| r.status == AppointmentStatus::Upcoming));
        prop_assert!(views.history.iter().all(|r| r.status != AppointmentStatus::Upcoming));
        prop_assert_eq!(views.len(), owned.len());

        // Union is the owner list, and nothing appears twice
        let mut ids: Vec<_> = views
            .upcoming
            .iter()
            .chain(views.history.iter())
            .map(|r| r.id.clone())
            .collect();
        ids.sort();
        let mut expected: Vec<_> = owned.iter().map(|r| r.id.clone()).collect();
        expected.sort();
        prop_assert_eq!(ids, expected);
    }
}
