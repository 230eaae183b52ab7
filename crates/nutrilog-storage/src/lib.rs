// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Nutrilog data-access layer.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, prepared
//! statement handles over `tokio-rusqlite`, and one data source per entity
//! kind that plugs into the repositories of `nutrilog-core`.

pub mod database;
pub mod migrations;
pub mod sources;
pub mod statement;
pub mod stores;

pub use database::Database;
pub use sources::{
    SourceOptions, SqliteMealSource, SqliteMealTypeSource, SqliteSportSource, SqliteUserSource,
};
pub use statement::{Statement, StatementError};
pub use stores::Stores;
