// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite data sources, one per entity kind.
//!
//! Each source owns its own [`Database`](crate::Database) connection so
//! that `last_insert_rowid()` only reflects inserts made through it. Inserts
//! hold the table's resource lock from the write until the id is read back.

mod meal;
mod meal_type;
mod sport;
mod table;
mod user;

use nutrilog_config::SourcesConfig;

pub use meal::SqliteMealSource;
pub use meal_type::SqliteMealTypeSource;
pub use sport::SqliteSportSource;
pub use user::SqliteUserSource;

/// Metric of SQLite sources unless configured otherwise.
pub const DEFAULT_SQLITE_METRIC: u32 = 1000;

/// Registration settings of a SQLite source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Overrides the default `sqlite-<table>` name.
    pub name: Option<String>,
    pub metric: u32,
    /// Treat empty results as final instead of passing them on.
    pub authoritative: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            name: None,
            metric: DEFAULT_SQLITE_METRIC,
            authoritative: false,
        }
    }
}

impl From<&SourcesConfig> for SourceOptions {
    fn from(config: &SourcesConfig) -> Self {
        Self {
            name: None,
            metric: config.sqlite_metric,
            authoritative: config.authoritative,
        }
    }
}

impl SourceOptions {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_metric(mut self, metric: u32) -> Self {
        self.metric = metric;
        self
    }

    pub fn authoritative(mut self, authoritative: bool) -> Self {
        self.authoritative = authoritative;
        self
    }

    fn resolve_name(&self, table: &str) -> String {
        self.name.clone().unwrap_or_else(|| format!("sqlite-{table}"))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use nutrilog_config::StorageConfig;
    use tempfile::TempDir;

    use crate::Database;

    /// Open a fresh database file inside `dir`.
    pub(crate) async fn open_db(dir: &TempDir) -> Database {
        let config = StorageConfig {
            database_path: dir.path().join("sources.db").to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        Database::open(&config).await.unwrap()
    }
}
