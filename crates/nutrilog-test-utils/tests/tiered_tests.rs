// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A fake cache tier in front of the SQLite sources of a [`TestHarness`].

use std::collections::HashSet;
use std::sync::Arc;

use nutrilog_core::{BackendError, EntityKind, MealType, Record, RecordId, User};
use nutrilog_test_utils::{fixtures, FakeSource, TestHarness};

#[tokio::test]
async fn soup_scenario_end_to_end() {
    let harness = TestHarness::new().await.unwrap();
    let stores = &harness.stores;

    let mut alice = Record::new(fixtures::user("Alice"));
    let user_id = stores.users.insert(&mut alice).await.unwrap();

    let mut soup = Record::new(fixtures::soup(user_id));
    let type_id = stores.meal_types.insert(&mut soup).await.unwrap();
    for date in [100, 200] {
        let mut meal = Record::new(fixtures::meal(type_id, user_id, date));
        stores.meals.insert(&mut meal).await.unwrap();
    }

    soup.set_name("Tomato soup");
    soup.set_proteins(4.5);
    stores.meal_types.update(&mut soup).await.unwrap();

    let types = stores.meal_types.find_all_by_user(user_id).await.unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].name, "Tomato soup");
    assert_eq!(types[0].calories, 300.0);

    let meals = stores.meals.find_all_by_user(user_id).await.unwrap();
    assert_eq!(meals.iter().map(|m| m.date).collect::<Vec<_>>(), vec![100, 200]);

    stores.meals.delete_all_of_type(type_id).await.unwrap();
    stores.meal_types.delete(type_id).await.unwrap();
    assert!(stores.meals.find_all_by_type(type_id).await.unwrap().is_empty());
    assert_eq!(stores.meal_types.find_by_id(type_id).await.unwrap(), None);
}

#[tokio::test]
async fn cache_miss_is_served_by_sqlite() {
    let mut harness = TestHarness::new().await.unwrap();
    let mut soup = Record::new(fixtures::soup(RecordId(1)));
    let id = harness.stores.meal_types.insert(&mut soup).await.unwrap();

    let cache = Arc::new(FakeSource::<MealType>::new("memory", 100));
    harness.stores.meal_types.add_data_source(cache.clone()).unwrap();

    let found = harness.stores.meal_types.find_by_id(id).await.unwrap();
    assert_eq!(found, Some(soup));
    assert_eq!(cache.calls().await, vec!["find_by_id"]);
}

#[tokio::test]
async fn failing_cache_write_lands_in_sqlite() {
    let mut harness = TestHarness::new().await.unwrap();
    let cache = Arc::new(FakeSource::<User>::new("memory", 100).failing_writes(503));
    harness.stores.users.add_data_source(cache.clone()).unwrap();

    let mut bob = Record::new(fixtures::user("Bob"));
    let id = harness.stores.users.insert(&mut bob).await.unwrap();

    assert_eq!(cache.row_count().await, 0);
    let stored = harness.stores.users.find_by_email("BOB@example.org").await.unwrap();
    assert_eq!(stored.and_then(|u| u.id()), Some(id));
}

#[tokio::test]
async fn locked_table_insert_falls_back_to_next_source() {
    let mut harness = TestHarness::builder()
        .with_acquire_timeout_ms(50)
        .build()
        .await
        .unwrap();
    let backup = Arc::new(FakeSource::<MealType>::new("backup", 5000).with_next_id(900));
    harness.stores.meal_types.add_data_source(backup.clone()).unwrap();

    let held = harness.stores.locks().acquire("meal_types").await.unwrap();
    let mut soup = Record::new(fixtures::soup(RecordId(1)));
    let id = harness.stores.meal_types.insert(&mut soup).await.unwrap();
    drop(held);

    assert_eq!(id, RecordId(900));
    assert_eq!(soup.id(), Some(RecordId(900)));
    assert_eq!(backup.calls().await, vec!["insert"]);
    let db = harness.open_database().await.unwrap();
    assert_eq!(db.row_count(EntityKind::MealType).await.unwrap(), 0);
}

#[tokio::test]
async fn sqlite_cache_tier_defers_to_authoritative_source() {
    let mut harness = TestHarness::builder()
        .cache_tier()
        .with_sqlite_metric(10)
        .build()
        .await
        .unwrap();
    let directory = Arc::new(
        FakeSource::<User>::new("directory", 1000)
            .authoritative()
            .with_row(RecordId(7), fixtures::user("Dana")),
    );
    harness.stores.users.add_data_source(directory.clone()).unwrap();

    let dana = harness.stores.users.find_by_name("dana").await.unwrap();
    assert_eq!(dana.and_then(|u| u.id()), Some(RecordId(7)));
    assert_eq!(directory.calls().await, vec!["find_by_name"]);

    // Neither tier knows this name; the authoritative answer is "absent".
    assert_eq!(harness.stores.users.find_by_name("erin").await.unwrap(), None);

    // Writes go to the cheaper SQLite tier first.
    let mut erin = Record::new(fixtures::user("Erin"));
    harness.stores.users.insert(&mut erin).await.unwrap();
    assert_eq!(directory.row_count().await, 1);
    let db = harness.open_database().await.unwrap();
    assert_eq!(db.row_count(EntityKind::User).await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_user_name_surfaces_conflict() {
    let harness = TestHarness::new().await.unwrap();
    let mut first = Record::new(fixtures::user("carol"));
    harness.stores.users.insert(&mut first).await.unwrap();

    let mut second = Record::new(fixtures::user("Carol"));
    let err = harness.stores.users.insert(&mut second).await.unwrap_err();
    assert_eq!(err.code(), Some(BackendError::CONFLICT));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_across_repositories() {
    let harness = Arc::new(TestHarness::new().await.unwrap());

    let mut tasks = Vec::new();
    for i in 0..12 {
        let harness = Arc::clone(&harness);
        tasks.push(tokio::spawn(async move {
            let mut meal = Record::new(fixtures::meal(RecordId(1), RecordId(1), i));
            let meal_id = harness.stores.meals.insert(&mut meal).await.unwrap();
            let mut run = Record::new(fixtures::run(RecordId(1), i));
            let run_id = harness.stores.sports.insert(&mut run).await.unwrap();
            (meal_id, run_id)
        }));
    }

    let mut meal_ids = HashSet::new();
    let mut run_ids = HashSet::new();
    for outcome in futures::future::join_all(tasks).await {
        let (meal_id, run_id) = outcome.unwrap();
        assert!(meal_ids.insert(meal_id));
        assert!(run_ids.insert(run_id));
    }

    let counts = harness.stores.row_counts().await.unwrap();
    let total: u64 = counts.iter().map(|(_, n)| n).sum();
    assert_eq!(total, 24);
    assert!(!harness.stores.locks().is_locked("meals"));
}
