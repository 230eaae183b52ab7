// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for integration tests against a real SQLite file.
//!
//! `TestHarness` opens [`Stores`] on a database inside a temp directory that
//! lives as long as the harness.

use nutrilog_config::NutrilogConfig;
use nutrilog_core::{BackendError, NutrilogError};
use nutrilog_storage::{Database, Stores};
use tracing::debug;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    authoritative: bool,
    sqlite_metric: Option<u32>,
    acquire_timeout_ms: Option<u64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            authoritative: true,
            sqlite_metric: None,
            acquire_timeout_ms: None,
        }
    }

    /// Register the SQLite sources as a cache tier instead of the
    /// authoritative store.
    pub fn cache_tier(mut self) -> Self {
        self.authoritative = false;
        self
    }

    pub fn with_sqlite_metric(mut self, metric: u32) -> Self {
        self.sqlite_metric = Some(metric);
        self
    }

    pub fn with_acquire_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.acquire_timeout_ms = Some(timeout_ms);
        self
    }

    pub async fn build(self) -> Result<TestHarness, NutrilogError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| {
            NutrilogError::from(BackendError::unavailable("cannot create temp dir").with_source(e))
        })?;

        let mut config = NutrilogConfig::default();
        config.storage.database_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .into_owned();
        config.sources.authoritative = self.authoritative;
        if let Some(metric) = self.sqlite_metric {
            config.sources.sqlite_metric = metric;
        }
        if let Some(timeout_ms) = self.acquire_timeout_ms {
            config.locking.acquire_timeout_ms = timeout_ms;
        }

        let stores = Stores::open(&config).await?;
        debug!(path = %config.storage.database_path, "test harness ready");

        Ok(TestHarness {
            stores,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// Repositories over a throwaway database.
pub struct TestHarness {
    /// One repository per kind, each holding one SQLite source.
    pub stores: Stores,
    pub config: NutrilogConfig,
    /// Kept alive so the database file outlives the stores.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with authoritative SQLite sources and default settings.
    pub async fn new() -> Result<Self, NutrilogError> {
        Self::builder().build().await
    }

    /// Open an extra connection to the harness database.
    pub async fn open_database(&self) -> Result<Database, NutrilogError> {
        Database::open(&self.config.storage).await
    }
}
