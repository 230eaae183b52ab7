// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repositories: ordered fallback over the data sources of one entity kind.
//!
//! Sources are kept sorted by ascending metric (stable, so equal metrics
//! keep insertion order). Writes go to the first source that accepts them.
//! Reads return the first `Found` answer; a source answering `NotFoundHere`
//! or failing passes the question down the chain.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::NutrilogError;
use crate::model::{Entity, Meal, MealType, Record, Sport, User};
use crate::traits::{DataSource, MealSource, MealTypeSource, SportSource, UserSource};
use crate::types::{EntityKind, HealthStatus, Lookup, RecordId};

pub type UserRepository = Repository<dyn UserSource>;
pub type MealTypeRepository = Repository<dyn MealTypeSource>;
pub type MealRepository = Repository<dyn MealSource>;
pub type SportRepository = Repository<dyn SportSource>;

/// Health of one source as seen by its repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHealth {
    pub name: String,
    pub metric: u32,
    pub status: HealthStatus,
}

/// The data sources of one entity kind, ordered by metric.
pub struct Repository<S: ?Sized + DataSource> {
    sources: Vec<Arc<S>>,
}

impl<S: ?Sized + DataSource> Default for Repository<S> {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
        }
    }
}

impl<S: ?Sized + DataSource> std::fmt::Debug for Repository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources: Vec<(&str, u32)> = self.sources.iter().map(|s| (s.name(), s.metric())).collect();
        f.debug_struct("Repository")
            .field("kind", &self.kind())
            .field("sources", &sources)
            .finish()
    }
}

impl<S: ?Sized + DataSource> Repository<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kind tag of this repository.
    pub fn kind(&self) -> EntityKind {
        <S::Entity as Entity>::KIND
    }

    /// Register a source and re-sort by metric.
    ///
    /// Rejects a source whose declared kind differs from the repository's,
    /// and a source instance that is already registered.
    pub fn add_data_source(&mut self, source: Arc<S>) -> Result<(), NutrilogError> {
        let kind = self.kind();
        if source.kind() != kind {
            return Err(NutrilogError::KindMismatch {
                expected: kind,
                found: source.kind(),
                source_name: source.name().to_string(),
            });
        }
        if self
            .sources
            .iter()
            .any(|existing| std::ptr::addr_eq(Arc::as_ptr(existing), Arc::as_ptr(&source)))
        {
            return Err(NutrilogError::DuplicateDataSource {
                kind,
                source_name: source.name().to_string(),
            });
        }

        debug!(%kind, source = source.name(), metric = source.metric(), "data source added");
        self.sources.push(source);
        self.sources.sort_by_key(|s| s.metric());
        Ok(())
    }

    /// Sources in the order they are consulted.
    pub fn data_sources(&self) -> &[Arc<S>] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Insert a new record through the cheapest source that accepts it.
    pub async fn insert(&self, record: &mut Record<S::Entity>) -> Result<RecordId, NutrilogError> {
        record.ensure_new()?;
        let mut walk = WriteWalk::new(self.kind(), "insert");
        for source in &self.sources {
            match source.insert(record).await {
                Ok(id) => {
                    walk.served(source.name(), source.metric());
                    return Ok(id);
                }
                Err(err) => walk.failed(source.name(), source.metric(), err)?,
            }
        }
        Err(walk.exhausted())
    }

    /// Write the changed fields of a persisted record through the cheapest
    /// source that accepts them.
    pub async fn update(&self, record: &mut Record<S::Entity>) -> Result<(), NutrilogError> {
        record.persisted_id()?;
        let mut walk = WriteWalk::new(self.kind(), "update");
        for source in &self.sources {
            match source.update(record).await {
                Ok(()) => {
                    walk.served(source.name(), source.metric());
                    return Ok(());
                }
                Err(err) => walk.failed(source.name(), source.metric(), err)?,
            }
        }
        Err(walk.exhausted())
    }

    /// Health of every source, in consultation order.
    pub async fn health(&self) -> Vec<SourceHealth> {
        let mut report = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let status = match source.health_check().await {
                Ok(status) => status,
                Err(err) => HealthStatus::Unhealthy(err.to_string()),
            };
            report.push(SourceHealth {
                name: source.name().to_string(),
                metric: source.metric(),
                status,
            });
        }
        report
    }
}

struct WriteWalk {
    kind: EntityKind,
    op: &'static str,
    last_error: Option<NutrilogError>,
}

impl WriteWalk {
    fn new(kind: EntityKind, op: &'static str) -> Self {
        Self {
            kind,
            op,
            last_error: None,
        }
    }

    fn served(&self, source: &str, metric: u32) {
        debug!(kind = %self.kind, op = self.op, source, metric, "write served");
    }

    /// Remember a retryable failure, or propagate anything else at once.
    fn failed(&mut self, source: &str, metric: u32, err: NutrilogError) -> Result<(), NutrilogError> {
        if !err.is_retryable() {
            return Err(err);
        }
        warn!(kind = %self.kind, op = self.op, source, metric, error = %err, "data source failed, trying next");
        self.last_error = Some(err);
        Ok(())
    }

    fn exhausted(self) -> NutrilogError {
        match self.last_error {
            Some(err) => {
                warn!(kind = %self.kind, op = self.op, "all data sources failed");
                err
            }
            None => NutrilogError::NoDataSources { kind: self.kind },
        }
    }
}

struct ReadWalk {
    kind: EntityKind,
    op: &'static str,
    answered: bool,
    last_error: Option<NutrilogError>,
}

impl ReadWalk {
    fn new(kind: EntityKind, op: &'static str) -> Self {
        Self {
            kind,
            op,
            answered: false,
            last_error: None,
        }
    }

    /// Returns the value once a source is authoritative for it.
    fn observe<T>(
        &mut self,
        source: &str,
        metric: u32,
        outcome: Result<Lookup<T>, NutrilogError>,
    ) -> Result<Option<T>, NutrilogError> {
        match outcome {
            Ok(Lookup::Found(value)) => {
                debug!(kind = %self.kind, op = self.op, source, metric, "read served");
                Ok(Some(value))
            }
            Ok(Lookup::NotFoundHere) => {
                debug!(kind = %self.kind, op = self.op, source, metric, "not found here");
                self.answered = true;
                Ok(None)
            }
            Err(err) if err.is_retryable() => {
                warn!(kind = %self.kind, op = self.op, source, metric, error = %err, "data source failed, trying next");
                self.last_error = Some(err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Nobody claimed the value: empty if any source answered, otherwise
    /// the last failure.
    fn finish<T: Default>(self) -> Result<T, NutrilogError> {
        match self.last_error {
            Some(err) if !self.answered => Err(err),
            _ => Ok(T::default()),
        }
    }
}

/// Runs a destructive operation on every source and reports the last failure.
struct FanOut {
    kind: EntityKind,
    op: &'static str,
    last_error: Option<NutrilogError>,
}

impl FanOut {
    fn new(kind: EntityKind, op: &'static str) -> Self {
        Self {
            kind,
            op,
            last_error: None,
        }
    }

    fn record<T: std::fmt::Debug>(&mut self, source: &str, outcome: Result<T, NutrilogError>) {
        match outcome {
            Ok(value) => debug!(kind = %self.kind, op = self.op, source, ?value, "applied"),
            Err(err) => {
                warn!(kind = %self.kind, op = self.op, source, error = %err, "data source failed");
                self.last_error = Some(err);
            }
        }
    }

    fn finish(self) -> Result<(), NutrilogError> {
        self.last_error.map_or(Ok(()), Err)
    }
}

impl Repository<dyn UserSource> {
    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<Record<User>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_by_id");
        for source in &self.sources {
            let outcome = source.find_by_id(id).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }

    /// Case-insensitive lookup by user name.
    pub async fn find_by_name(&self, user_name: &str) -> Result<Option<Record<User>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_by_name");
        for source in &self.sources {
            let outcome = source.find_by_name(user_name).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }

    /// Case-insensitive lookup by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Record<User>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_by_email");
        for source in &self.sources {
            let outcome = source.find_by_email(email).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }
}

impl Repository<dyn MealTypeSource> {
    pub async fn find_by_id(&self, id: RecordId) -> Result<Option<Record<MealType>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_by_id");
        for source in &self.sources {
            let outcome = source.find_by_id(id).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }

    pub async fn find_all_by_user(
        &self,
        user_id: RecordId,
    ) -> Result<Vec<Record<MealType>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_all_by_user");
        for source in &self.sources {
            let outcome = source.find_all_by_user(user_id).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }

    /// Delete the meal type from every source so no tier keeps a stale row.
    pub async fn delete(&self, id: RecordId) -> Result<(), NutrilogError> {
        let mut fan_out = FanOut::new(self.kind(), "delete");
        for source in &self.sources {
            fan_out.record(source.name(), source.delete(id).await);
        }
        fan_out.finish()
    }
}

impl Repository<dyn MealSource> {
    pub async fn find_all_by_type(&self, type_id: RecordId) -> Result<Vec<Record<Meal>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_all_by_type");
        for source in &self.sources {
            let outcome = source.find_all_by_type(type_id).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }

    pub async fn find_all_by_user(&self, user_id: RecordId) -> Result<Vec<Record<Meal>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_all_by_user");
        for source in &self.sources {
            let outcome = source.find_all_by_user(user_id).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }

    /// Delete every meal of a type from every source.
    pub async fn delete_all_of_type(&self, type_id: RecordId) -> Result<(), NutrilogError> {
        let mut fan_out = FanOut::new(self.kind(), "delete_all_of_type");
        for source in &self.sources {
            fan_out.record(source.name(), source.delete_all_of_type(type_id).await);
        }
        fan_out.finish()
    }
}

impl Repository<dyn SportSource> {
    pub async fn find_all_by_user(&self, user_id: RecordId) -> Result<Vec<Record<Sport>>, NutrilogError> {
        let mut walk = ReadWalk::new(self.kind(), "find_all_by_user");
        for source in &self.sources {
            let outcome = source.find_all_by_user(user_id).await;
            if let Some(found) = walk.observe(source.name(), source.metric(), outcome)? {
                return Ok(found);
            }
        }
        walk.finish()
    }
}
