// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback, ordering, and fan-out behavior of repositories over fake sources.

use std::sync::Arc;

use nutrilog_core::{
    BackendError, DataSource, EntityKind, HealthStatus, Meal, MealRepository, MealType,
    MealTypeRepository, NutrilogError, Record, RecordId, SportRepository, User, UserRepository,
};
use nutrilog_test_utils::{fixtures, FakeSource};
use proptest::prelude::*;

fn names<S: ?Sized + DataSource>(sources: &[Arc<S>]) -> Vec<String> {
    sources.iter().map(|s| s.name().to_string()).collect()
}

#[test]
fn sources_are_consulted_by_ascending_metric() {
    let mut repo = MealTypeRepository::new();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("sqlite", 1000)))
        .unwrap();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("memory", 100)))
        .unwrap();

    assert_eq!(names(repo.data_sources()), vec!["memory", "sqlite"]);
}

#[test]
fn kind_mismatch_is_rejected() {
    let mut repo = MealRepository::new();
    let wrong = FakeSource::<Meal>::new("confused", 10).with_kind(EntityKind::Sport);

    let err = repo.add_data_source(Arc::new(wrong)).unwrap_err();
    assert!(matches!(
        err,
        NutrilogError::KindMismatch {
            expected: EntityKind::Meal,
            found: EntityKind::Sport,
            ..
        }
    ));
    assert!(repo.is_empty());
}

#[test]
fn same_instance_cannot_be_added_twice() {
    let mut repo = MealRepository::new();
    let source = Arc::new(FakeSource::<Meal>::new("memory", 10));
    repo.add_data_source(source.clone()).unwrap();

    let err = repo.add_data_source(source).unwrap_err();
    assert!(matches!(err, NutrilogError::DuplicateDataSource { .. }));

    // A distinct instance with the same name is fine.
    repo.add_data_source(Arc::new(FakeSource::<Meal>::new("memory", 10)))
        .unwrap();
    assert_eq!(repo.len(), 2);
}

#[tokio::test]
async fn write_without_sources_fails() {
    let repo = SportRepository::new();
    let mut record = Record::new(fixtures::run(RecordId(1), 0));
    let err = repo.insert(&mut record).await.unwrap_err();
    assert!(matches!(err, NutrilogError::NoDataSources { kind: EntityKind::Sport }));
    assert!(!record.is_persisted());
}

#[tokio::test]
async fn read_without_sources_is_empty() {
    let repo = SportRepository::new();
    assert!(repo.find_all_by_user(RecordId(1)).await.unwrap().is_empty());
    assert_eq!(UserRepository::new().find_by_name("x").await.unwrap(), None);
}

#[tokio::test]
async fn insert_falls_back_to_next_source() {
    let cheap = Arc::new(FakeSource::<MealType>::new("cheap", 100).failing_writes(503));
    let durable = Arc::new(FakeSource::<MealType>::new("durable", 1000).with_next_id(7));
    let mut repo = MealTypeRepository::new();
    repo.add_data_source(cheap.clone()).unwrap();
    repo.add_data_source(durable.clone()).unwrap();

    let mut soup = Record::new(fixtures::soup(RecordId(1)));
    soup.set_calories(250.0);
    let id = repo.insert(&mut soup).await.unwrap();

    assert_eq!(id, RecordId(7));
    assert_eq!(soup.id(), Some(RecordId(7)));
    assert!(soup.changed_fields().is_empty());
    assert_eq!(cheap.calls().await, vec!["insert"]);
    assert_eq!(durable.row(id).await.map(|t| t.calories), Some(250.0));
}

#[tokio::test]
async fn first_successful_write_stops_the_walk() {
    let first = Arc::new(FakeSource::<Meal>::new("first", 1));
    let second = Arc::new(FakeSource::<Meal>::new("second", 2));
    let mut repo = MealRepository::new();
    repo.add_data_source(second.clone()).unwrap();
    repo.add_data_source(first.clone()).unwrap();

    let mut meal = Record::new(fixtures::meal(RecordId(3), RecordId(1), 10));
    repo.insert(&mut meal).await.unwrap();

    assert_eq!(first.row_count().await, 1);
    assert!(second.calls().await.is_empty());
}

#[tokio::test]
async fn all_sources_failing_returns_last_error() {
    let mut repo = MealRepository::new();
    repo.add_data_source(Arc::new(FakeSource::<Meal>::new("a", 1).failing_writes(503)))
        .unwrap();
    repo.add_data_source(Arc::new(FakeSource::<Meal>::new("b", 2).failing_writes(500)))
        .unwrap();

    let mut meal = Record::new(fixtures::meal(RecordId(3), RecordId(1), 10));
    let err = repo.insert(&mut meal).await.unwrap_err();
    assert_eq!(err.code(), Some(500));
    assert!(err.to_string().contains("b failed insert"));
}

#[tokio::test]
async fn precondition_violations_never_reach_sources() {
    let source = Arc::new(FakeSource::<Meal>::new("memory", 1));
    let mut repo = MealRepository::new();
    repo.add_data_source(source.clone()).unwrap();

    let mut stored = Record::loaded(RecordId(1), fixtures::meal(RecordId(3), RecordId(1), 10));
    assert!(matches!(
        repo.insert(&mut stored).await.unwrap_err(),
        NutrilogError::Model(_)
    ));

    let mut fresh = Record::new(fixtures::meal(RecordId(3), RecordId(1), 10));
    assert!(matches!(
        repo.update(&mut fresh).await.unwrap_err(),
        NutrilogError::Model(_)
    ));
    assert!(source.calls().await.is_empty());
}

#[tokio::test]
async fn update_of_unknown_row_falls_through_with_not_found() {
    let mut repo = MealTypeRepository::new();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("memory", 1)))
        .unwrap();

    let mut ghost = Record::loaded(RecordId(99), fixtures::soup(RecordId(1)));
    ghost.set_name("Ghost");
    let err = repo.update(&mut ghost).await.unwrap_err();
    assert_eq!(err.code(), Some(BackendError::NOT_FOUND));
    assert!(!ghost.changed_fields().is_empty());
}

#[tokio::test]
async fn read_falls_through_cache_miss() {
    let alice = fixtures::user("Alice");
    let cache = Arc::new(FakeSource::<User>::new("cache", 10));
    let store = Arc::new(FakeSource::<User>::new("store", 1000).with_row(RecordId(4), alice.clone()));
    let mut repo = UserRepository::new();
    repo.add_data_source(cache.clone()).unwrap();
    repo.add_data_source(store).unwrap();

    let found = repo.find_by_name("ALICE").await.unwrap().unwrap();
    assert_eq!(found.id(), Some(RecordId(4)));
    assert_eq!(found.entity(), &alice);
    assert_eq!(cache.calls().await, vec!["find_by_name"]);
}

#[tokio::test]
async fn authoritative_empty_answer_stops_the_walk() {
    let primary = Arc::new(FakeSource::<Meal>::new("primary", 10).authoritative());
    let stale = Arc::new(
        FakeSource::<Meal>::new("stale", 20)
            .with_row(RecordId(1), fixtures::meal(RecordId(3), RecordId(1), 10)),
    );
    let mut repo = MealRepository::new();
    repo.add_data_source(primary).unwrap();
    repo.add_data_source(stale.clone()).unwrap();

    assert!(repo.find_all_by_type(RecordId(3)).await.unwrap().is_empty());
    assert!(stale.calls().await.is_empty());
}

#[tokio::test]
async fn failed_read_then_miss_is_empty() {
    let mut repo = MealTypeRepository::new();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("down", 1).failing_reads(503)))
        .unwrap();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("empty", 2)))
        .unwrap();

    assert_eq!(repo.find_by_id(RecordId(1)).await.unwrap(), None);
}

#[tokio::test]
async fn every_read_failing_returns_last_error() {
    let mut repo = MealTypeRepository::new();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("a", 1).failing_reads(500)))
        .unwrap();
    repo.add_data_source(Arc::new(FakeSource::<MealType>::new("b", 2).failing_reads(503)))
        .unwrap();

    let err = repo.find_all_by_user(RecordId(1)).await.unwrap_err();
    assert_eq!(err.code(), Some(503));
}

#[tokio::test]
async fn deletes_reach_every_source() {
    let soup = fixtures::soup(RecordId(1));
    let cache = Arc::new(FakeSource::<MealType>::new("cache", 10).with_row(RecordId(5), soup.clone()));
    let broken = Arc::new(FakeSource::<MealType>::new("broken", 20).failing_writes(503));
    let store = Arc::new(FakeSource::<MealType>::new("store", 30).with_row(RecordId(5), soup));
    let mut repo = MealTypeRepository::new();
    repo.add_data_source(cache.clone()).unwrap();
    repo.add_data_source(broken.clone()).unwrap();
    repo.add_data_source(store.clone()).unwrap();

    let err = repo.delete(RecordId(5)).await.unwrap_err();
    assert_eq!(err.code(), Some(503));
    assert_eq!(cache.row_count().await, 0);
    assert_eq!(store.row_count().await, 0);
    assert_eq!(broken.calls().await, vec!["delete"]);
}

#[tokio::test]
async fn delete_all_of_type_clears_every_tier() {
    let cache = Arc::new(
        FakeSource::<Meal>::new("cache", 10)
            .with_row(RecordId(1), fixtures::meal(RecordId(3), RecordId(1), 10)),
    );
    let store = Arc::new(
        FakeSource::<Meal>::new("store", 20)
            .with_row(RecordId(1), fixtures::meal(RecordId(3), RecordId(1), 10))
            .with_row(RecordId(2), fixtures::meal(RecordId(3), RecordId(1), 20))
            .with_row(RecordId(3), fixtures::meal(RecordId(4), RecordId(1), 30)),
    );
    let mut repo = MealRepository::new();
    repo.add_data_source(cache.clone()).unwrap();
    repo.add_data_source(store.clone()).unwrap();

    repo.delete_all_of_type(RecordId(3)).await.unwrap();
    assert_eq!(cache.row_count().await, 0);
    assert_eq!(store.row_count().await, 1);
}

#[tokio::test]
async fn health_lists_sources_in_order() {
    let mut repo = MealRepository::new();
    repo.add_data_source(Arc::new(FakeSource::<Meal>::new("slow", 50).failing_reads(503)))
        .unwrap();
    repo.add_data_source(Arc::new(FakeSource::<Meal>::new("fast", 5)))
        .unwrap();

    let report = repo.health().await;
    assert_eq!(report[0].name, "fast");
    assert_eq!(report[0].status, HealthStatus::Healthy);
    assert_eq!(report[1].metric, 50);
    assert!(matches!(report[1].status, HealthStatus::Degraded(_)));
}

proptest! {
    #[test]
    fn ordering_is_stable_for_equal_metrics(metrics in prop::collection::vec(0u32..4, 1..10)) {
        let mut repo = MealRepository::new();
        for (i, metric) in metrics.iter().enumerate() {
            repo.add_data_source(Arc::new(FakeSource::<Meal>::new(i.to_string(), *metric)))
                .unwrap();
        }

        let mut expected: Vec<(u32, usize)> =
            metrics.iter().copied().zip(0..).collect();
        expected.sort_by_key(|(metric, _)| *metric);
        let expected: Vec<String> = expected.iter().map(|(_, i)| i.to_string()).collect();

        prop_assert_eq!(names(repo.data_sources()), expected);
    }
}
