// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait shared by every data source.

use async_trait::async_trait;

use crate::error::NutrilogError;
use crate::model::{Entity, Record};
use crate::types::{EntityKind, HealthStatus, Lookup, RecordId};

/// Answer of a source to a single-record read.
pub type SingleLookup<E> = Lookup<Option<Record<E>>>;

/// Answer of a source to a multi-record read.
pub type ListLookup<E> = Lookup<Vec<Record<E>>>;

/// A storage backend bound to one entity kind.
///
/// Repositories order their sources by [`metric`](DataSource::metric),
/// lowest first. The kind-specific read capabilities live in
/// [`UserSource`](super::UserSource), [`MealTypeSource`](super::MealTypeSource),
/// [`MealSource`](super::MealSource), and [`SportSource`](super::SportSource).
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// The entity this source stores.
    type Entity: Entity;

    /// Human-readable name of this source instance, used in logs.
    fn name(&self) -> &str;

    /// Kind tag declared by the source. Must equal the repository's.
    fn kind(&self) -> EntityKind {
        <Self::Entity as Entity>::KIND
    }

    /// Access cost. Lower is preferred.
    fn metric(&self) -> u32;

    /// Persist a new record, assign its identity, and clear its changed
    /// fields. Fails if the record already has an identity.
    async fn insert(&self, record: &mut Record<Self::Entity>) -> Result<RecordId, NutrilogError>;

    /// Write the changed fields of a persisted record and clear them.
    /// A record matching no row fails with a not-found backend error.
    async fn update(&self, record: &mut Record<Self::Entity>) -> Result<(), NutrilogError>;

    /// Report whether the backend is reachable.
    async fn health_check(&self) -> Result<HealthStatus, NutrilogError> {
        Ok(HealthStatus::Healthy)
    }
}
