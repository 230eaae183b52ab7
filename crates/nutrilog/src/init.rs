// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `nutrilog init` command implementation.

use nutrilog_config::NutrilogConfig;
use nutrilog_core::{EntityKind, NutrilogError};
use nutrilog_storage::Database;
use strum::IntoEnumIterator;
use tracing::info;

/// Open (and thereby create and migrate) the configured database.
pub async fn run_init(config: &NutrilogConfig) -> Result<(), NutrilogError> {
    let db = Database::open(&config.storage).await?;
    info!(path = %db.path(), "database ready");

    println!("nutrilog: database ready at {}", db.path());
    for kind in EntityKind::iter() {
        let rows = db.row_count(kind).await?;
        println!("  {:<12} {rows} rows", kind.table());
    }
    db.close().await
}
