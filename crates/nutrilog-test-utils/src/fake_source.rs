// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory data source for repository tests.
//!
//! `FakeSource` implements every kind capability over a `BTreeMap`. Failures
//! can be injected separately for reads and writes, and every call is logged
//! so tests can assert which tiers were consulted.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use nutrilog_core::traits::{ListLookup, SingleLookup};
use nutrilog_core::{
    BackendError, DataSource, Entity, EntityKind, HealthStatus, Lookup, Meal, MealSource,
    MealType, MealTypeSource, NutrilogError, Record, RecordId, Sport, SportSource, User,
    UserSource,
};

struct FakeState<E> {
    rows: BTreeMap<RecordId, E>,
    next_id: i64,
    fail_reads: Option<u16>,
    fail_writes: Option<u16>,
    calls: Vec<String>,
}

/// A data source that keeps rows in memory.
pub struct FakeSource<E: Entity> {
    name: String,
    metric: u32,
    kind: EntityKind,
    authoritative: bool,
    state: Mutex<FakeState<E>>,
}

impl<E: Entity> FakeSource<E> {
    /// A cache-tier source with no rows.
    pub fn new(name: impl Into<String>, metric: u32) -> Self {
        Self {
            name: name.into(),
            metric,
            kind: E::KIND,
            authoritative: false,
            state: Mutex::new(FakeState {
                rows: BTreeMap::new(),
                next_id: 1,
                fail_reads: None,
                fail_writes: None,
                calls: Vec::new(),
            }),
        }
    }

    /// Answer empty reads with `Found` instead of `NotFoundHere`.
    pub fn authoritative(mut self) -> Self {
        self.authoritative = true;
        self
    }

    /// Declare a kind other than the entity's own.
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Seed a stored row. Later inserts get ids above it.
    pub fn with_row(mut self, id: RecordId, entity: E) -> Self {
        let state = self.state.get_mut();
        state.next_id = state.next_id.max(id.get() + 1);
        state.rows.insert(id, entity);
        self
    }

    /// First id handed out by `insert`.
    pub fn with_next_id(mut self, next_id: i64) -> Self {
        self.state.get_mut().next_id = next_id;
        self
    }

    /// Fail every read with the given backend code.
    pub fn failing_reads(mut self, code: u16) -> Self {
        self.state.get_mut().fail_reads = Some(code);
        self
    }

    /// Fail every write and delete with the given backend code.
    pub fn failing_writes(mut self, code: u16) -> Self {
        self.state.get_mut().fail_writes = Some(code);
        self
    }

    pub async fn set_fail_reads(&self, code: Option<u16>) {
        self.state.lock().await.fail_reads = code;
    }

    pub async fn set_fail_writes(&self, code: Option<u16>) {
        self.state.lock().await.fail_writes = code;
    }

    /// Operations received so far, oldest first.
    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }

    pub async fn row_count(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    /// Stored value for `id`, if any.
    pub async fn row(&self, id: RecordId) -> Option<E> {
        self.state.lock().await.rows.get(&id).cloned()
    }

    fn failure(&self, op: &str, code: u16) -> NutrilogError {
        BackendError::new(code, format!("{} failed {op}", self.name)).into()
    }

    async fn read(
        &self,
        op: &str,
        matches: impl Fn(&E) -> bool,
    ) -> Result<Vec<Record<E>>, NutrilogError> {
        let mut state = self.state.lock().await;
        state.calls.push(op.to_string());
        if let Some(code) = state.fail_reads {
            return Err(self.failure(op, code));
        }
        Ok(state
            .rows
            .iter()
            .filter(|(_, entity)| matches(entity))
            .map(|(id, entity)| Record::loaded(*id, entity.clone()))
            .collect())
    }

    async fn find_one(
        &self,
        op: &str,
        matches: impl Fn(&E) -> bool,
    ) -> Result<SingleLookup<E>, NutrilogError> {
        let row = self.read(op, matches).await?.into_iter().next();
        Ok(Lookup::row(row, self.authoritative))
    }

    async fn find_many(
        &self,
        op: &str,
        matches: impl Fn(&E) -> bool,
    ) -> Result<ListLookup<E>, NutrilogError> {
        let rows = self.read(op, matches).await?;
        Ok(Lookup::rows(rows, self.authoritative))
    }

    async fn remove(
        &self,
        op: &str,
        matches: impl Fn(RecordId, &E) -> bool,
    ) -> Result<usize, NutrilogError> {
        let mut state = self.state.lock().await;
        state.calls.push(op.to_string());
        if let Some(code) = state.fail_writes {
            return Err(self.failure(op, code));
        }
        let before = state.rows.len();
        state.rows.retain(|id, entity| !matches(*id, entity));
        Ok(before - state.rows.len())
    }
}

#[async_trait]
impl<E: Entity> DataSource for FakeSource<E> {
    type Entity = E;

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> EntityKind {
        self.kind
    }

    fn metric(&self) -> u32 {
        self.metric
    }

    async fn insert(&self, record: &mut Record<E>) -> Result<RecordId, NutrilogError> {
        record.ensure_new()?;
        let mut state = self.state.lock().await;
        state.calls.push("insert".to_string());
        if let Some(code) = state.fail_writes {
            return Err(self.failure("insert", code));
        }
        let id = RecordId(state.next_id);
        state.next_id += 1;
        state.rows.insert(id, record.entity().clone());
        record.assign_id(id)?;
        record.clear_changed_fields();
        Ok(id)
    }

    async fn update(&self, record: &mut Record<E>) -> Result<(), NutrilogError> {
        let id = record.persisted_id()?;
        let mut state = self.state.lock().await;
        state.calls.push("update".to_string());
        if let Some(code) = state.fail_writes {
            return Err(self.failure("update", code));
        }
        match state.rows.get_mut(&id) {
            Some(stored) => *stored = record.entity().clone(),
            None => return Err(self.failure("update", BackendError::NOT_FOUND)),
        }
        record.clear_changed_fields();
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        let state = self.state.lock().await;
        Ok(match (state.fail_reads, state.fail_writes) {
            (None, None) => HealthStatus::Healthy,
            (Some(_), Some(_)) => HealthStatus::Unhealthy("reads and writes failing".into()),
            _ => HealthStatus::Degraded("failure injected".into()),
        })
    }
}

#[async_trait]
impl UserSource for FakeSource<User> {
    async fn find_by_id(&self, id: RecordId) -> Result<SingleLookup<User>, NutrilogError> {
        let found = self.read("find_by_id", |_| true).await?;
        let row = found.into_iter().find(|r| r.id() == Some(id));
        Ok(Lookup::row(row, self.authoritative))
    }

    async fn find_by_name(&self, user_name: &str) -> Result<SingleLookup<User>, NutrilogError> {
        self.find_one("find_by_name", |u| u.user_name.eq_ignore_ascii_case(user_name))
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<SingleLookup<User>, NutrilogError> {
        self.find_one("find_by_email", |u| u.email.eq_ignore_ascii_case(email))
            .await
    }
}

#[async_trait]
impl MealTypeSource for FakeSource<MealType> {
    async fn find_by_id(&self, id: RecordId) -> Result<SingleLookup<MealType>, NutrilogError> {
        let found = self.read("find_by_id", |_| true).await?;
        let row = found.into_iter().find(|r| r.id() == Some(id));
        Ok(Lookup::row(row, self.authoritative))
    }

    async fn find_all_by_user(
        &self,
        user_id: RecordId,
    ) -> Result<ListLookup<MealType>, NutrilogError> {
        self.find_many("find_all_by_user", |t| t.user_id == user_id)
            .await
    }

    async fn delete(&self, id: RecordId) -> Result<(), NutrilogError> {
        self.remove("delete", |row_id, _| row_id == id).await?;
        Ok(())
    }
}

#[async_trait]
impl MealSource for FakeSource<Meal> {
    async fn find_all_by_type(&self, type_id: RecordId) -> Result<ListLookup<Meal>, NutrilogError> {
        self.find_many("find_all_by_type", |m| m.type_id == type_id)
            .await
    }

    async fn find_all_by_user(&self, user_id: RecordId) -> Result<ListLookup<Meal>, NutrilogError> {
        self.find_many("find_all_by_user", |m| m.user_id == user_id)
            .await
    }

    async fn delete_all_of_type(&self, type_id: RecordId) -> Result<usize, NutrilogError> {
        self.remove("delete_all_of_type", |_, m| m.type_id == type_id)
            .await
    }
}

#[async_trait]
impl SportSource for FakeSource<Sport> {
    async fn find_all_by_user(
        &self,
        user_id: RecordId,
    ) -> Result<ListLookup<Sport>, NutrilogError> {
        self.find_many("find_all_by_user", |s| s.user_id == user_id)
            .await
    }
}
