// SPDX-FileCopyrightText: 2026 Nutrilog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied on
//! every [`Database::open`](crate::Database::open).

use nutrilog_core::{BackendError, NutrilogError};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply pending migrations. Returns how many were applied.
///
/// Refinery records applied versions in `refinery_schema_history`.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<usize, NutrilogError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| BackendError::internal("schema migration failed").with_source(e))?;
    Ok(report.applied_migrations().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &rusqlite::Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn creates_all_entity_tables() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        let applied = run_migrations(&mut conn).unwrap();
        assert_eq!(applied, 1);

        let tables = tables(&conn);
        for table in ["meal_types", "meals", "sports", "users"] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
    }

    #[test]
    fn second_run_applies_nothing() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), 0);
    }

    #[test]
    fn user_name_is_unique_ignoring_case() {
        let mut conn = rusqlite::Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO users (user_name, pwd, email) VALUES ('Anna', 'x', 'a@x')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO users (user_name, pwd, email) VALUES ('anna', 'y', 'b@x')",
            [],
        );
        assert!(dup.is_err());
    }
}
