// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being ignored.

use serde::{Deserialize, Serialize};

/// Log levels accepted by `log.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Top-level Nutrilog configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NutrilogConfig {
    /// SQLite database settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Resource lock settings.
    #[serde(default)]
    pub locking: LockingConfig,

    /// Data source registration settings.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// SQLite database configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// How long a connection waits on a locked database file.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    "nutrilog.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Resource lock configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockingConfig {
    /// Upper bound on waiting for a table lock before an insert fails over.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_ms: default_acquire_timeout_ms(),
        }
    }
}

fn default_acquire_timeout_ms() -> u64 {
    5000
}

/// How the SQLite data sources register with their repositories.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourcesConfig {
    /// Metric of every SQLite source. Lower is consulted first.
    #[serde(default = "default_sqlite_metric")]
    pub sqlite_metric: u32,

    /// Whether an empty SQLite result is final or passes to the next source.
    #[serde(default)]
    pub authoritative: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            sqlite_metric: default_sqlite_metric(),
            authoritative: false,
        }
    }
}

fn default_sqlite_metric() -> u32 {
    1000
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Default level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
