// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the four repositories over the SQLite sources.

use std::sync::Arc;
use std::time::Duration;

use nutrilog_config::NutrilogConfig;
use nutrilog_core::{
    EntityKind, MealRepository, MealTypeRepository, NutrilogError, ResourceMutexManager,
    SourceHealth, SportRepository, UserRepository,
};
use strum::IntoEnumIterator;
use tracing::info;

use crate::database::Database;
use crate::sources::{
    SourceOptions, SqliteMealSource, SqliteMealTypeSource, SqliteSportSource, SqliteUserSource,
};

/// One repository per entity kind, all backed by the configured database.
///
/// Every SQLite source gets its own connection; all of them share one
/// [`ResourceMutexManager`].
#[derive(Debug)]
pub struct Stores {
    pub users: UserRepository,
    pub meal_types: MealTypeRepository,
    pub meals: MealRepository,
    pub sports: SportRepository,
    locks: ResourceMutexManager,
    admin: Database,
}

impl Stores {
    pub async fn open(config: &NutrilogConfig) -> Result<Self, NutrilogError> {
        let locks = ResourceMutexManager::with_timeout(Some(Duration::from_millis(
            config.locking.acquire_timeout_ms,
        )));
        let options = SourceOptions::from(&config.sources);

        let admin = Database::open(&config.storage).await?;

        let mut users = UserRepository::new();
        users.add_data_source(Arc::new(SqliteUserSource::new(
            Database::open(&config.storage).await?,
            locks.clone(),
            options.clone(),
        )))?;

        let mut meal_types = MealTypeRepository::new();
        meal_types.add_data_source(Arc::new(SqliteMealTypeSource::new(
            Database::open(&config.storage).await?,
            locks.clone(),
            options.clone(),
        )))?;

        let mut meals = MealRepository::new();
        meals.add_data_source(Arc::new(SqliteMealSource::new(
            Database::open(&config.storage).await?,
            locks.clone(),
            options.clone(),
        )))?;

        let mut sports = SportRepository::new();
        sports.add_data_source(Arc::new(SqliteSportSource::new(
            Database::open(&config.storage).await?,
            locks.clone(),
            options,
        )))?;

        info!(path = %config.storage.database_path, "stores opened");
        Ok(Self {
            users,
            meal_types,
            meals,
            sports,
            locks,
            admin,
        })
    }

    /// The lock manager shared by every source.
    pub fn locks(&self) -> &ResourceMutexManager {
        &self.locks
    }

    /// Stored rows per entity kind.
    pub async fn row_counts(&self) -> Result<Vec<(EntityKind, u64)>, NutrilogError> {
        let mut counts = Vec::new();
        for kind in EntityKind::iter() {
            counts.push((kind, self.admin.row_count(kind).await?));
        }
        Ok(counts)
    }

    /// Health of every registered source, grouped by kind.
    pub async fn health(&self) -> Vec<(EntityKind, Vec<SourceHealth>)> {
        vec![
            (EntityKind::User, self.users.health().await),
            (EntityKind::MealType, self.meal_types.health().await),
            (EntityKind::Meal, self.meals.health().await),
            (EntityKind::Sport, self.sports.health().await),
        ]
    }
}
